//! Export of rendered surfaces.

/// PNG encoding and artifact naming.
pub mod png;

pub use png::{Export, ensure_parent_dir, export_file_name, export_png};
