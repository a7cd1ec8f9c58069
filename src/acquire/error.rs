use std::time::Duration;

/// Why a single access path was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Candidate URI.
        url: String,
        /// Transport-level description.
        reason: String,
    },

    /// No response within the per-attempt timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Candidate URI.
        url: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The response status was not 2xx.
    #[error("{url} responded with status {status}")]
    Status {
        /// Candidate URI.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The declared content type is not `image/*`.
    #[error("{url} returned non-image content type {content_type:?}")]
    NotAnImage {
        /// Candidate URI.
        url: String,
        /// Declared content type, if any.
        content_type: Option<String>,
    },
}

impl AttemptError {
    /// Candidate URI this failure belongs to.
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Timeout { url, .. }
            | Self::Status { url, .. }
            | Self::NotAnImage { url, .. } => url,
        }
    }
}

/// Terminal failure of an acquisition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// Every candidate failed; `last` is the failure of the final candidate.
    #[error("all {attempts} access paths failed; last error: {last}")]
    Exhausted {
        /// Number of candidates attempted.
        attempts: usize,
        /// Failure recorded for the last candidate.
        last: AttemptError,
    },

    /// No attempt error was captured.
    #[error("image fetch failed")]
    Failed,
}

impl AcquireError {
    /// The last recorded attempt failure, if any.
    pub fn last_attempt(&self) -> Option<&AttemptError> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Failed => None,
        }
    }
}
