//! Resilient image acquisition.
//!
//! A canonical image URL is expanded into ordered access paths ([`plan`]), which the
//! [`acquirer`] walks sequentially through an [`source::ImageSource`] until one yields image
//! bytes.

/// Sequential fallback with per-attempt timeouts.
pub mod acquirer;
/// Attempt and acquisition failures.
pub mod error;
/// Direct and relay access-path planning.
pub mod plan;
/// Fetch capability and its implementations.
pub mod source;

pub use acquirer::{AcquireOpts, AcquiredBytes, Acquirer, DEFAULT_ATTEMPT_TIMEOUT};
pub use error::{AcquireError, AttemptError};
pub use plan::{AccessKind, AccessPath, AccessPathPlanner, DEFAULT_RELAYS, RelayTemplate};
pub use source::{
    FetchResponse, HttpImageSource, ImageSource, IncomingResponse, MapImageSource,
};
