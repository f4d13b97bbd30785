use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;

use super::config::{SkillConfig, SEARCH_RESULT_CAP};
use super::errors::SkillError;
use crate::api_models::{SearchReport, SearchResult, NO_LINK, NO_SNIPPET, NO_TITLE};
use crate::client::HttpTransport;

/// Raw hit as handed back by an engine; missing fields get placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineHit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub href: Option<String>,
}

/// A ranked text search backend.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns at most `limit` hits in relevance order.
    async fn text_search(&self, query: &str, limit: usize) -> Result<Vec<EngineHit>, SkillError>;
}

/// Clamps requests, ranks hits and converts engine failures into
/// `SkillError` values.
pub struct SearchProvider {
    engine: Arc<dyn SearchEngine>,
    result_cap: usize,
}

impl SearchProvider {
    /// `result_cap` can lower the ceiling of [`SEARCH_RESULT_CAP`] but never raise it.
    pub fn new(engine: Arc<dyn SearchEngine>, result_cap: usize) -> Self {
        Self {
            engine,
            result_cap: result_cap.min(SEARCH_RESULT_CAP),
        }
    }

    /// Builds the provider backed by the compiled-in engine. Fails with
    /// `DependencyMissing` when no engine was built into the binary.
    pub fn from_config(
        config: &SkillConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, SkillError> {
        #[cfg(feature = "duckduckgo")]
        {
            let engine = duckduckgo::DuckDuckGo::new(config, transport);
            Ok(Self::new(Arc::new(engine), config.search_result_cap))
        }

        #[cfg(not(feature = "duckduckgo"))]
        {
            let _ = (config, transport);
            Err(SkillError::dependency_missing(
                "DuckDuckGo search",
                "Rebuild with: cargo build --features duckduckgo",
            ))
        }
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<SearchReport, SkillError> {
        let limit = max_results.min(self.result_cap);

        let hits = self
            .engine
            .text_search(query, limit)
            .await
            .map_err(|e| {
                error!("Error performing web search on {}: {}", self.engine.name(), e);
                e
            })?;

        let results: Vec<SearchResult> = hits
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(position, hit)| SearchResult {
                rank: position + 1,
                title: hit.title.unwrap_or_else(|| NO_TITLE.to_string()),
                snippet: hit.body.unwrap_or_else(|| NO_SNIPPET.to_string()),
                link: hit.href.unwrap_or_else(|| NO_LINK.to_string()),
            })
            .collect();

        info!(
            "Web search completed: {} results for '{}'",
            results.len(),
            query
        );
        Ok(SearchReport::new(query, results))
    }
}

#[cfg(feature = "duckduckgo")]
pub mod duckduckgo {
    use super::*;
    use scraper::{ElementRef, Html, Selector};
    use url::Url;

    /// Scrapes the DuckDuckGo HTML endpoint.
    pub struct DuckDuckGo {
        transport: Arc<dyn HttpTransport>,
        endpoint: String,
    }

    impl DuckDuckGo {
        pub fn new(config: &SkillConfig, transport: Arc<dyn HttpTransport>) -> Self {
            Self {
                transport,
                endpoint: config.duckduckgo_endpoint.clone(),
            }
        }
    }

    #[async_trait]
    impl SearchEngine for DuckDuckGo {
        fn name(&self) -> &'static str {
            "DuckDuckGo"
        }

        async fn text_search(&self, query: &str, limit: usize) -> Result<Vec<EngineHit>, SkillError> {
            let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
            let response = self.transport.get_ok(&url).await?;
            parse_results(&response.body, limit)
        }
    }

    fn selector(css: &str) -> Result<Selector, SkillError> {
        Selector::parse(css).map_err(|e| SkillError::parse("selector", e))
    }

    fn element_text(element: ElementRef<'_>) -> String {
        element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn parse_results(html: &str, limit: usize) -> Result<Vec<EngineHit>, SkillError> {
        let document = Html::parse_document(html);
        let result_selector = selector(".result:not(.result--ad)")?;
        let link_selector = selector("a.result__a")?;
        let snippet_selector = selector(".result__snippet")?;

        let mut hits = Vec::new();
        for result in document.select(&result_selector) {
            if hits.len() >= limit {
                break;
            }
            let Some(anchor) = result.select(&link_selector).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href").and_then(clean_result_link) else {
                continue;
            };

            let title = element_text(anchor);
            let body = result
                .select(&snippet_selector)
                .next()
                .map(element_text)
                .filter(|s| !s.is_empty());

            hits.push(EngineHit {
                title: Some(title).filter(|t| !t.is_empty()),
                body,
                href: Some(href),
            });
        }

        if hits.is_empty() && html.contains("anomaly-modal") {
            return Err(SkillError::other(
                "RateLimited",
                "DuckDuckGo rejected the request with a bot challenge",
            ));
        }

        Ok(hits)
    }

    /// Resolves `/l/?uddg=` redirect links to their target; drops ad links.
    pub(crate) fn clean_result_link(href: &str) -> Option<String> {
        let absolute = if href.starts_with("//") {
            format!("https:{}", href)
        } else if href.starts_with('/') {
            format!("https://duckduckgo.com{}", href)
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&absolute).ok()?;
        let on_ddg = parsed
            .host_str()
            .map(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
            .unwrap_or(false);

        if !on_ddg {
            return Some(absolute);
        }
        if parsed.path().starts_with("/l/") {
            return parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned());
        }
        None
    }
}
