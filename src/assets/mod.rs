/// Image payload decoding.
pub mod decode;

pub use decode::{Bitmap, decode_image};
