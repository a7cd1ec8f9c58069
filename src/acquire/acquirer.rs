use std::sync::Arc;
use std::time::Duration;

use crate::acquire::error::{AcquireError, AttemptError};
use crate::acquire::plan::{AccessPath, AccessPathPlanner};
use crate::acquire::source::{ImageSource, IncomingResponse};

/// Per-attempt timeout used when none is configured.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(20);

/// Options for [`Acquirer`].
#[derive(Clone, Copy, Debug)]
pub struct AcquireOpts {
    /// Upper bound on the wait for a single access path to respond. Once the status and headers
    /// are in, the body is read without a deadline.
    pub timeout: Duration,
}

impl Default for AcquireOpts {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

/// Image bytes accepted from one access path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcquiredBytes {
    /// Response body.
    pub bytes: Vec<u8>,
    /// Declared content type (always `image/*`).
    pub content_type: String,
    /// The access path that produced the bytes.
    pub path: AccessPath,
}

/// Sequential fallback over the planner's access paths.
///
/// Attempts never overlap. The first accepted response wins; there is no loop-back to earlier
/// candidates and no retry of the chain as a whole.
pub struct Acquirer {
    source: Arc<dyn ImageSource>,
    planner: AccessPathPlanner,
    opts: AcquireOpts,
}

impl Acquirer {
    /// Create an acquirer over `source` with the default relays and timeout.
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            planner: AccessPathPlanner::default(),
            opts: AcquireOpts::default(),
        }
    }

    /// Replace the planner.
    pub fn with_planner(mut self, planner: AccessPathPlanner) -> Self {
        self.planner = planner;
        self
    }

    /// Replace the options.
    pub fn with_opts(mut self, opts: AcquireOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Configured planner.
    pub fn planner(&self) -> &AccessPathPlanner {
        &self.planner
    }

    /// Configured options.
    pub fn opts(&self) -> AcquireOpts {
        self.opts
    }

    /// Fetch image bytes for `url`, falling back through every access path in order.
    #[tracing::instrument(skip(self), fields(timeout = ?self.opts.timeout))]
    pub async fn acquire(&self, url: &str) -> Result<AcquiredBytes, AcquireError> {
        let candidates = self.planner.plan(url);
        let attempts = candidates.len();
        let mut last_err: Option<AttemptError> = None;

        for path in candidates {
            tracing::debug!(uri = %path.uri, kind = ?path.kind, "attempting access path");
            match self.attempt(&path.uri).await {
                Ok((bytes, content_type)) => {
                    tracing::info!(
                        uri = %path.uri,
                        bytes = bytes.len(),
                        content_type = %content_type,
                        "access path accepted"
                    );
                    return Ok(AcquiredBytes {
                        bytes,
                        content_type,
                        path,
                    });
                }
                Err(e) => {
                    tracing::debug!(error = %e, "access path rejected");
                    last_err = Some(e);
                }
            }
        }

        tracing::warn!(attempts, "all access paths failed");
        Err(match last_err {
            Some(last) => AcquireError::Exhausted { attempts, last },
            None => AcquireError::Failed,
        })
    }

    async fn attempt(&self, uri: &str) -> Result<(Vec<u8>, String), AttemptError> {
        let res = tokio::time::timeout(self.opts.timeout, self.source.fetch(uri))
            .await
            .map_err(|_| AttemptError::Timeout {
                url: uri.to_string(),
                timeout: self.opts.timeout,
            })??;
        let content_type = accept(uri, &res)?;
        let body = res.into_body().await?;
        Ok((body, content_type))
    }
}

/// Validate a response head: 2xx status and an `image/*` content type.
fn accept(uri: &str, res: &IncomingResponse) -> Result<String, AttemptError> {
    if !(200..300).contains(&res.status) {
        return Err(AttemptError::Status {
            url: uri.to_string(),
            status: res.status,
        });
    }
    match &res.content_type {
        Some(ct) if is_image_media_type(ct) => Ok(ct.clone()),
        content_type => Err(AttemptError::NotAnImage {
            url: uri.to_string(),
            content_type: content_type.clone(),
        }),
    }
}

fn is_image_media_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

#[cfg(test)]
#[path = "../../tests/unit/acquire/acquirer.rs"]
mod tests;
