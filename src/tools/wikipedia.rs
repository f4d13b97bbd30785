use log::{error, info};
use serde_json::Value;
use std::sync::Arc;

use super::config::SkillConfig;
use super::errors::SkillError;
use super::text::{take_chars, truncate_with};
use crate::api_models::{ArticleContent, WikiArticleReport, WikiSearchReport, WikiSnippet};
use crate::client::HttpTransport;

const SNIPPET_CHARS: usize = 300;
const RELATED_SNIPPET_CHARS: usize = 150;
const RELATED_LIMIT: usize = 5;
const CATEGORY_LIMIT: usize = 5;

/// A page as returned by `prop=extracts|info`, absent pages filtered out.
#[derive(Debug, Clone)]
struct WikiPage {
    title: String,
    extract: String,
    url: String,
    categories: Vec<String>,
    links: Vec<String>,
}

impl WikiPage {
    fn from_value(page: &Value) -> Option<Self> {
        if page.get("missing").is_some() || page.get("invalid").is_some() {
            return None;
        }
        let titles = |key: &str| -> Vec<String> {
            page[key]
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item["title"].as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default()
        };

        Some(Self {
            title: page["title"].as_str()?.to_string(),
            extract: page["extract"].as_str().unwrap_or_default().trim().to_string(),
            url: page["fullurl"].as_str().unwrap_or_default().to_string(),
            categories: titles("categories"),
            links: titles("links"),
        })
    }
}

/// Client for the MediaWiki action API of a Wikipedia edition.
pub struct WikipediaClient {
    transport: Arc<dyn HttpTransport>,
    config: SkillConfig,
}

impl WikipediaClient {
    pub fn new(config: &SkillConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            config: config.clone(),
        }
    }

    pub async fn search(&self, query: &str, language: &str) -> Result<WikiSearchReport, SkillError> {
        let result = self.search_inner(query, language).await;
        if let Err(e) = &result {
            error!("Wikipedia search error: {}", e);
        }
        result
    }

    async fn search_inner(&self, query: &str, language: &str) -> Result<WikiSearchReport, SkillError> {
        let params = format!(
            "prop=extracts|info|links&exintro=1&explaintext=1&inprop=url&plnamespace=0&pllimit={}",
            RELATED_LIMIT
        );
        let page = self
            .query_pages(language, &[query], &params)
            .await?
            .into_iter()
            .next()
            .flatten();

        let Some(page) = page else {
            return Ok(WikiSearchReport::NoResults {
                query: query.to_string(),
                message: format!("No Wikipedia articles found for: {}", query),
                results: Vec::new(),
            });
        };

        let related = if page.links.is_empty() {
            Vec::new()
        } else {
            let linked: Vec<&str> = page.links.iter().map(String::as_str).collect();
            let params = format!(
                "prop=extracts|info&exintro=1&explaintext=1&inprop=url&exlimit={}",
                RELATED_LIMIT
            );
            let pages = self.query_pages(language, &linked, &params).await?;
            pages
                .into_iter()
                .flatten()
                .map(|p| WikiSnippet {
                    snippet: ellipsize(&p.extract, RELATED_SNIPPET_CHARS),
                    title: p.title,
                    url: p.url,
                })
                .collect()
        };

        info!("Wikipedia search completed for '{}'", query);
        Ok(WikiSearchReport::Success {
            query: query.to_string(),
            result: WikiSnippet {
                snippet: ellipsize(&page.extract, SNIPPET_CHARS),
                title: page.title,
                url: page.url,
            },
            related,
        })
    }

    pub async fn get_article(
        &self,
        title: &str,
        summary_only: bool,
        max_length: usize,
        language: &str,
    ) -> Result<WikiArticleReport, SkillError> {
        let mut params = format!(
            "prop=extracts|info|categories&explaintext=1&inprop=url&cllimit={}",
            CATEGORY_LIMIT
        );
        if summary_only {
            params.push_str("&exintro=1");
        }

        let page = self
            .query_pages(language, &[title], &params)
            .await
            .map_err(|e| {
                error!("Wikipedia article error: {}", e);
                e
            })?
            .into_iter()
            .next()
            .flatten();

        let Some(page) = page else {
            return Ok(WikiArticleReport::NotFound {
                title: title.to_string(),
                message: format!("Wikipedia article not found: {}", title),
                suggestion: "Try using --query to search for the correct article title".to_string(),
            });
        };

        let (content_type, content) = if summary_only {
            (ArticleContent::Summary, page.extract)
        } else {
            let marker = format!("\n\n[... Content truncated at {} characters]", max_length);
            (
                ArticleContent::FullText,
                truncate_with(page.extract, max_length, &marker),
            )
        };
        let character_count = content.chars().count();

        info!(
            "Wikipedia article retrieved: '{}' ({} chars)",
            page.title, character_count
        );
        Ok(WikiArticleReport::Success {
            title: page.title,
            content_type,
            content,
            url: page.url,
            categories: page.categories.into_iter().take(CATEGORY_LIMIT).collect(),
            character_count,
        })
    }

    /// One `action=query` round trip; the result keeps the order of `titles`,
    /// with `None` for pages that do not exist.
    async fn query_pages(
        &self,
        language: &str,
        titles: &[&str],
        params: &str,
    ) -> Result<Vec<Option<WikiPage>>, SkillError> {
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(SkillError::invalid_input(format!(
                "Invalid Wikipedia language code: {}",
                language
            )));
        }

        let url = format!(
            "{}?action=query&format=json&formatversion=2&redirects=1&titles={}&{}",
            self.config.wikipedia_api(language),
            urlencoding::encode(&titles.join("|")),
            params
        );
        let response = self.transport.get_ok(&url).await?;
        let json: Value =
            serde_json::from_str(&response.body).map_err(|e| SkillError::parse("JSON", e))?;

        if let Some(info) = json["error"]["info"].as_str() {
            return Err(SkillError::other("ApiError", info));
        }

        let pages: Vec<Value> = json["query"]["pages"].as_array().cloned().unwrap_or_default();
        let resolve = |requested: &str| -> String {
            let mut name = requested.to_string();
            for key in ["normalized", "redirects"] {
                if let Some(mappings) = json["query"][key].as_array() {
                    for mapping in mappings {
                        if mapping["from"].as_str() == Some(name.as_str()) {
                            if let Some(to) = mapping["to"].as_str() {
                                name = to.to_string();
                            }
                        }
                    }
                }
            }
            name
        };

        Ok(titles
            .iter()
            .map(|requested| {
                let target = resolve(requested);
                pages
                    .iter()
                    .find(|page| page["title"].as_str() == Some(target.as_str()))
                    .and_then(WikiPage::from_value)
            })
            .collect())
    }
}

fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", take_chars(text, max_chars))
    } else {
        text.to_string()
    }
}
