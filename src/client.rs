use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect, Client, StatusCode};
use std::time::Duration;

use crate::tools::config::{SkillConfig, REQUEST_TIMEOUT_SECS};
use crate::tools::errors::SkillError;

/// Buffered outcome of one GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub content_type: Option<String>,
    pub final_url: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// The single network seam used by every tool.
///
/// Implementations follow redirects, apply the fixed timeout and the user
/// agent, and report transport failures as `SkillError::Timeout` or
/// `SkillError::Other`. Error statuses are returned as responses so callers
/// can classify them.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, SkillError>;

    /// Like `get`, but a 4xx/5xx status becomes `SkillError::HttpStatus`.
    async fn get_ok(&self, url: &str) -> Result<HttpResponse, SkillError> {
        let response = self.get(url).await?;
        if response.is_error() {
            return Err(SkillError::http_status(response.status, &response.reason));
        }
        Ok(response)
    }
}

pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown")
}

pub struct ReqwestTransport {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    pub fn new(config: &SkillConfig) -> Result<Self, SkillError> {
        Self::with_timeout(config, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    fn with_timeout(config: &SkillConfig, timeout: Duration) -> Result<Self, SkillError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| SkillError::other("ClientBuildError", e))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    fn classify(&self, error: reqwest::Error) -> SkillError {
        if error.is_timeout() {
            return SkillError::Timeout {
                seconds: self.timeout_secs,
            };
        }

        let kind = if error.is_connect() {
            "ConnectError"
        } else if error.is_redirect() {
            "TooManyRedirects"
        } else if error.is_decode() || error.is_body() {
            "DecodeError"
        } else if error.is_builder() {
            "InvalidRequest"
        } else {
            "RequestError"
        };

        let mut message = error.to_string();
        if let Some(source) = std::error::Error::source(&error) {
            message.push_str(&format!(" ({})", source));
        }
        SkillError::other(kind, message)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, SkillError> {
        let response = self
            .client
            .get(url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let final_url = response.url().to_string();

        // error bodies are never inspected
        let body = if status.is_client_error() || status.is_server_error() {
            String::new()
        } else {
            response.text().await.map_err(|e| self.classify(e))?
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: reason_phrase(status.as_u16()).to_string(),
            content_type,
            final_url,
            body,
        })
    }
}
