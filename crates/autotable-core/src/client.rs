//! Backend transport
//!
//! Sends statement text to the search engine over HTTP. The trait exists so
//! the recovery handler can be driven by an in-process fake in tests.

use crate::error::{CoreError, Result};
use crate::settings::{Settings, DEFAULT_SQL_PATH};
use async_trait::async_trait;
use std::time::Duration;

/// Default content type for statement requests.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Where a statement should be sent and how the response should be encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// Endpoint path relative to the backend base URL, query string included
    pub path: String,
    /// Content type of the request; `None` means [`DEFAULT_CONTENT_TYPE`]
    pub content_type: Option<String>,
}

impl RequestTarget {
    pub fn new(path: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            path: path.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    /// The internal default target for statements whose response nobody sees
    pub fn sql_default() -> Self {
        Self::new(DEFAULT_SQL_PATH, None)
    }
}

/// Raw backend response
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
}

/// One-statement-at-a-time channel to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a single statement; a backend-reported failure surfaces as
    /// [`CoreError::Execution`]
    async fn send(&self, statement: &str, target: &RequestTarget) -> Result<BackendResponse>;
}

/// HTTP transport to the backend's statement endpoint
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create a transport from loaded settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.backend_url.clone(), settings.request_timeout_secs)
    }

    fn url_for(&self, target: &RequestTarget) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, statement: &str, target: &RequestTarget) -> Result<BackendResponse> {
        let content_type = target.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        let response = self
            .client
            .post(self.url_for(target))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(statement.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CoreError::execution(format!(
                "backend returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        if let Some(message) = backend_error(&body) {
            return Err(CoreError::execution(message));
        }

        Ok(BackendResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Extract a backend-reported error from a response body.
///
/// The engine reports statement failures inside an otherwise successful HTTP
/// response, either as `{"error": "..."}` or as the first element of a
/// result array.
fn backend_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let head = match &value {
        serde_json::Value::Array(items) => items.first()?,
        other => other,
    };
    let message = head.get("error")?.as_str()?;
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
