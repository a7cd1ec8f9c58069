use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::acquire::error::AttemptError;
use crate::foundation::error::{MemeError, MemeResult};

/// A complete response held in memory, before any validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Declared `Content-Type`, if present.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// A `200 OK` response with the given content type.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            body: body.into(),
        }
    }

    /// A response with an arbitrary status and no body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }
}

type BodyFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>, AttemptError>> + Send>>;

/// A response whose status and headers have arrived. The body may still be in flight.
pub struct IncomingResponse {
    /// HTTP status code.
    pub status: u16,
    /// Declared `Content-Type`, if present.
    pub content_type: Option<String>,
    body: BodyFuture,
}

impl IncomingResponse {
    /// Wrap a body that is still being received.
    pub fn streaming(
        status: u16,
        content_type: Option<String>,
        body: impl Future<Output = Result<Vec<u8>, AttemptError>> + Send + 'static,
    ) -> Self {
        Self {
            status,
            content_type,
            body: Box::pin(body),
        }
    }

    /// Receive the rest of the body.
    pub async fn into_body(self) -> Result<Vec<u8>, AttemptError> {
        self.body.await
    }
}

impl From<FetchResponse> for IncomingResponse {
    fn from(res: FetchResponse) -> Self {
        let body = res.body;
        Self::streaming(res.status, res.content_type, async move { Ok(body) })
    }
}

impl fmt::Debug for IncomingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Capability for fetching a URL.
///
/// `fetch` resolves once the status and headers are in; the body is read separately through
/// [`IncomingResponse::into_body`]. Implementations report transport failures as
/// [`AttemptError::Transport`] and return every completed response as-is; status and
/// content-type checks belong to the caller, and so do timeouts.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Issue one request for `url`.
    async fn fetch(&self, url: &str) -> Result<IncomingResponse, AttemptError>;
}

/// [`ImageSource`] backed by a `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    /// Build a source with a fresh client.
    pub fn new() -> MemeResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("memecraft/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MemeError::Other(anyhow::Error::new(e).context("build http client")))?;
        Ok(Self { client })
    }

    /// Reuse an existing client (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<IncomingResponse, AttemptError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let url = url.to_string();
        Ok(IncomingResponse::streaming(status, content_type, async move {
            match res.bytes().await {
                Ok(body) => Ok(body.to_vec()),
                Err(e) => Err(AttemptError::Transport {
                    url,
                    reason: e.to_string(),
                }),
            }
        }))
    }
}

/// In-memory [`ImageSource`] for tests and offline use.
///
/// Unknown URLs fail with a transport error. Every requested URL is recorded in call order.
#[derive(Debug, Default)]
pub struct MapImageSource {
    routes: HashMap<String, Result<FetchResponse, String>>,
    requests: Mutex<Vec<String>>,
}

impl MapImageSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `url`.
    pub fn respond(mut self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.routes.insert(url.into(), Ok(response));
        self
    }

    /// Fail `url` at the transport level.
    pub fn fail(mut self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Err(reason.into()));
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ImageSource for MapImageSource {
    async fn fetch(&self, url: &str) -> Result<IncomingResponse, AttemptError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        match self.routes.get(url) {
            Some(Ok(res)) => Ok(res.clone().into()),
            Some(Err(reason)) => Err(AttemptError::Transport {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Err(AttemptError::Transport {
                url: url.to_string(),
                reason: "no route".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/acquire/source.rs"]
mod tests;
