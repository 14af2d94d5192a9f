//! GitHub repository contents client
//!
//! Builds contents API URLs, issues the single GET through a [`Transport`],
//! and decodes the base64 `content` field of the response.

mod transport;

pub use transport::{HttpResponse, HttpTransport, Transport};

use std::sync::Arc;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::context::FetchTarget;

/// Default contents API host
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Everything that can stop a background fetch from updating the cache
#[derive(Debug, Error)]
pub enum FetchError {
    /// Owner, repo or selected file is unset
    #[error("missing context, skipping fetch")]
    MissingContext,

    /// Server answered with a non-success status
    #[error("GitHub fetch failed with status {status}")]
    FetchFailed { status: u16 },

    /// Request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// Body is not valid JSON
    #[error("failed to parse response: {0}")]
    ParseFailed(String),

    /// Response has no usable `content` field
    #[error("no file content returned")]
    NoContentField,

    /// `content` is not valid base64 or not valid UTF-8 text
    #[error("failed to decode content: {0}")]
    DecodeFailed(String),
}

impl FetchError {
    /// True for outcomes that are skipped with a warning rather than logged as failures
    pub fn is_silent(&self) -> bool {
        matches!(self, FetchError::MissingContext | FetchError::NoContentField)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

/// Builds `{base}/repos/{owner}/{repo}/contents/{path}`
///
/// Each segment is escaped on its own, so a `/` inside `path` becomes `%2F`.
pub fn contents_url(base: &str, owner: &str, repo: &str, path: &str) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        urlencoding::encode(path)
    )
}

/// Extracts the raw `content` string from a contents API response body
pub fn parse_content_field(body: &str) -> Result<String, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::ParseFailed(e.to_string()))?;

    match value.get("content") {
        Some(Value::String(content)) if !content.is_empty() => Ok(content.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Bool(false)) => {
            Err(FetchError::NoContentField)
        }
        Some(other) => Err(FetchError::ParseFailed(format!(
            "content field is not a string: {}",
            other
        ))),
    }
}

/// Standard alphabet, padding optional
const CONTENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Strips whitespace from `raw` and base64-decodes it into text
pub fn decode_content(raw: &str) -> Result<String, FetchError> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = CONTENT_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| FetchError::DecodeFailed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| FetchError::DecodeFailed(e.to_string()))
}

/// Client for the repository contents endpoint
#[derive(Clone)]
pub struct ContentsClient {
    transport: Arc<dyn Transport>,
    /// Base URL for the API (overridable for testing)
    base_url: String,
}

impl ContentsClient {
    /// Creates a client against `base_url` using the given transport
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Fetches and decodes one file
    ///
    /// One GET, no retry. Returns the decoded text.
    pub async fn fetch_file(&self, target: &FetchTarget) -> Result<String, FetchError> {
        let url = contents_url(&self.base_url, &target.owner, &target.repo, &target.path);
        debug!(%url, "requesting file contents");

        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            return Err(FetchError::FetchFailed {
                status: response.status,
            });
        }

        let raw = parse_content_field(&response.body)?;
        decode_content(&raw)
    }
}

impl std::fmt::Debug for ContentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
