use crate::acquire::AcquireError;

/// Convenience result alias used across the crate.
pub type MemeResult<T> = Result<T, MemeError>;

/// Top-level error type for acquisition, decoding, rendering and export.
///
/// Every variant is recoverable at the caller: none of them invalidates the session.
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    /// Every access path for an image failed.
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquireError),

    /// Bytes arrived but are not a displayable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// The render target could not draw the requested content.
    #[error("render error: {0}")]
    Render(String),

    /// The raster surface could not be encoded.
    #[error("export error: {0}")]
    Export(String),

    /// The template listing was unavailable or malformed.
    #[error("listing error: {0}")]
    Listing(String),

    /// Invalid input (e.g. a template with zero dimensions).
    #[error("validation error: {0}")]
    Validation(String),

    /// Escape hatch for wrapped errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemeError {
    /// Build a [`MemeError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MemeError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MemeError::Export`].
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`MemeError::Listing`].
    pub fn listing(msg: impl Into<String>) -> Self {
        Self::Listing(msg.into())
    }

    /// Build a [`MemeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
