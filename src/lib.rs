//! memecraft puts top and bottom captions over meme templates.
//!
//! The crate is organised around a small number of pieces:
//!
//! - An [`Acquirer`] fetches a template image through an ordered list of access paths (direct,
//!   then relays) with a per-attempt timeout.
//! - [`decode_image`] turns the bytes into a premultiplied [`Bitmap`].
//! - A [`Compositor`] lays out and draws the image and captions onto a [`RenderTarget`]
//!   ([`CpuTarget`] for real pixels, [`RecordingTarget`] for headless use).
//! - [`export_png`] serializes the surface.
//! - A [`Session`] ties it together: one selection, one live resource, staleness checks on
//!   asynchronous results.
//!
//! The [`listing`] module fetches and filters the public template catalogue.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image acquisition over direct and relay access paths.
pub mod acquire;
/// Decoding of acquired image bytes.
pub mod assets;
/// Caption layout and compositing.
pub mod compose;
/// PNG export.
pub mod encode;
/// Template listing client and filter.
pub mod listing;
/// Render targets.
pub mod render;
/// Selection lifecycle and resource ownership.
pub mod session;

pub use crate::foundation::core::{Captions, Point, Rgba8, Size, Template};
pub use crate::foundation::error::{MemeError, MemeResult};

pub use crate::acquire::{
    AccessKind, AccessPath, AccessPathPlanner, AcquireError, AcquireOpts, AcquiredBytes, Acquirer,
    AttemptError, FetchResponse, HttpImageSource, ImageSource, IncomingResponse, MapImageSource,
};
pub use crate::assets::{Bitmap, decode_image};
pub use crate::compose::{ComposeOpts, Compositor, RenderPlan, TextBlock};
pub use crate::encode::{Export, export_file_name, export_png};
pub use crate::render::{CpuTarget, DrawOp, FrameRGBA, RecordingTarget, RenderTarget, TextMeasure};
pub use crate::session::{
    AcquiredResource, CommitOutcome, Failure, ResourceTracker, Selection, SelectionState,
    SelectionTicket, Session,
};
