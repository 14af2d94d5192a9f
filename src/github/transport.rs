//! HTTP transport for the contents client

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use super::FetchError;

const USER_AGENT: &str = concat!("echojr/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET and returns the raw response
///
/// Implementations must not retry; a request either completes once or fails.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// `reqwest`-backed transport with no timeout and no per-request headers
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        // GitHub rejects requests without a User-Agent; browsers always send one.
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to build HTTP client, falling back to defaults without User-Agent");
                Client::new()
            });
        Self { http_client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
