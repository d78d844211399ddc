//! Remote retrieval of lazily loaded chunk files.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::options::HttpOptions;

/// Errors returned by a [`ChunkFetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with an error status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// The request could not be sent or its body could not be read.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The fetcher does not serve this URL.
    #[error("no remote source for {0}")]
    NotAvailable(String),
}

/// Fetches a chunk file by URL.
#[async_trait]
pub trait ChunkFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str, options: &HttpOptions) -> Result<Vec<u8>, FetchError>;
}

/// [`ChunkFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChunkFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &HttpOptions) -> Result<Vec<u8>, FetchError> {
        let request_error = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut request = self.client.get(url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout_ms) = options.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }

        tracing::debug!(url, "fetching chunk");
        let response = request.send().await.map_err(request_error)?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        Ok(body.to_vec())
    }
}
