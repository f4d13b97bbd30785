use log::{debug, error, info};
use std::sync::Arc;

use super::errors::SkillError;
use super::text::{extract_page, take_chars};
use crate::api_models::{FetchOutcome, NO_TITLE};
use crate::client::HttpTransport;

/// Retrieves single pages and reduces them to text.
///
/// One GET per call, no retries. Every failure is folded into the returned
/// `FetchOutcome` rather than propagated.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn fetch(&self, url: &str, include_html: bool, max_length: usize) -> FetchOutcome {
        if !is_http_url(url) {
            let error = SkillError::invalid_url(url);
            error!("Error fetching URL {}: {}", url, error);
            return FetchOutcome::failed(url, &error);
        }

        let response = match self.transport.get_ok(url).await {
            Ok(response) => response,
            Err(error) => {
                error!("Error fetching URL {}: {:?} - {}", url, error.kind(), error);
                return FetchOutcome::failed(url, &error);
            }
        };

        if response.final_url != url {
            debug!("{} redirected to {}", url, response.final_url);
        }

        let page = extract_page(&response.body, max_length);

        let mut outcome = FetchOutcome::fetched(
            url,
            page.title.unwrap_or_else(|| NO_TITLE.to_string()),
            page.text,
            response.status,
            response.content_type,
        );
        if include_html {
            outcome.html_content = Some(take_chars(&response.body, max_length));
        }

        info!(
            "Successfully fetched content from: {} ({} chars)",
            url, outcome.text_length
        );
        outcome
    }
}

pub fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
