use crate::acquire::error::AcquireError;
use crate::foundation::core::Template;
use crate::session::resource::AcquiredResource;

/// Why the current selection has nothing to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    /// No access path produced image bytes.
    Acquisition(AcquireError),
    /// Bytes arrived but could not be decoded.
    Decode(String),
}

impl Failure {
    /// Notice shown to the user; both kinds recover by picking another template.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Acquisition(_) => "Image failed to load. Try another meme.",
            Self::Decode(_) => "Image could not be decoded. Try another meme.",
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acquisition(e) => write!(f, "acquisition failed: {e}"),
            Self::Decode(msg) => write!(f, "decode failed: {msg}"),
        }
    }
}

/// Lifecycle of one selection.
#[derive(Debug)]
pub enum SelectionState {
    /// Acquisition has not been committed yet.
    Pending,
    /// The resource holds a decoded bitmap.
    Ready(AcquiredResource),
    /// Nothing drawable. Undecodable bytes stay owned until the selection goes away.
    Failed {
        /// What went wrong.
        failure: Failure,
        /// Resource kept for a decode failure; `None` for acquisition failures.
        resource: Option<AcquiredResource>,
    },
}

impl SelectionState {
    /// `true` while waiting for an acquisition result.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The owned resource, if any.
    pub fn resource(&self) -> Option<&AcquiredResource> {
        match self {
            Self::Pending => None,
            Self::Ready(r) => Some(r),
            Self::Failed { resource, .. } => resource.as_ref(),
        }
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }

    pub(crate) fn release(&mut self) {
        match self {
            Self::Pending => {}
            Self::Ready(r) => {
                r.release();
            }
            Self::Failed { resource, .. } => {
                if let Some(r) = resource {
                    r.release();
                }
            }
        }
    }
}

/// The template being edited and the state of its image.
#[derive(Debug)]
pub struct Selection {
    /// Selected template.
    pub template: Template,
    /// Acquisition/decoding state.
    pub state: SelectionState,
}

/// Token returned by `Session::select`, checked again at commit time.
///
/// A ticket goes stale as soon as another template is selected or the user goes back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionTicket {
    pub(crate) generation: u64,
    pub(crate) template: Template,
}

impl SelectionTicket {
    /// Selection generation this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Template the acquisition is for.
    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// Result of committing an acquisition outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Bitmap decoded and rendered.
    Ready,
    /// The selection failed; see `Session::selection`.
    Failed,
    /// The ticket was superseded; any payload was released and the session left untouched.
    Stale,
}
