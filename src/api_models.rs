use serde::Serialize;

use crate::tools::errors::{ErrorKind, SkillError};

pub const NO_TITLE: &str = "No title";
pub const NO_SNIPPET: &str = "No snippet";
pub const NO_LINK: &str = "No link";

// Web search

/// One ranked hit; `rank` is 1-based in the engine's relevance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "index")]
    pub rank: usize,
    pub title: String,
    pub snippet: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub result_count: usize,
    pub results: Vec<SearchResult>,
}

impl SearchReport {
    pub fn new(query: &str, results: Vec<SearchResult>) -> Self {
        Self {
            query: query.to_string(),
            result_count: results.len(),
            results,
        }
    }
}

/// Result of one URL retrieval attempt. `text_content` is present exactly
/// when `success` is true, `error_kind`/`error` exactly when it is false.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    pub text_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl FetchOutcome {
    pub fn fetched(
        url: &str,
        title: String,
        text_content: String,
        status_code: u16,
        content_type: Option<String>,
    ) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            title: Some(title),
            content_type,
            text_length: text_content.chars().count(),
            text_content: Some(text_content),
            status_code: Some(status_code),
            html_content: None,
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failed(url: &str, error: &SkillError) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            title: None,
            content_type: None,
            text_content: None,
            text_length: 0,
            status_code: error.status_code(),
            html_content: None,
            error_kind: Some(error.kind()),
            error_message: Some(error.to_string()),
        }
    }
}

/// A fetch outcome tagged with its 1-based position in the top-N selection.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedPage {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalReport {
    pub query: String,
    #[serde(rename = "search_results")]
    pub search_report: SearchReport,
    pub fetched_content: Vec<FetchedPage>,
    pub total_results: usize,
    pub fetched_count: usize,
}

// arXiv

#[derive(Debug, Clone, Serialize)]
pub struct Paper {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub paper_id: String,
    pub title: String,
    pub authors: String,
    pub published: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub url: String,
    pub pdf_url: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaperSearchReport {
    pub query: String,
    pub result_count: usize,
    pub results: Vec<Paper>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PaperLookup {
    Found(Paper),
    Missing { paper_id: String, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PaperLookupReport {
    pub papers_retrieved: usize,
    pub papers: Vec<PaperLookup>,
}

// Wikipedia

#[derive(Debug, Clone, Serialize)]
pub struct WikiSnippet {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WikiSearchReport {
    NoResults {
        query: String,
        message: String,
        results: Vec<WikiSnippet>,
    },
    Success {
        query: String,
        result: WikiSnippet,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        related: Vec<WikiSnippet>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleContent {
    Summary,
    FullText,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WikiArticleReport {
    NotFound {
        title: String,
        message: String,
        suggestion: String,
    },
    Success {
        title: String,
        content_type: ArticleContent,
        content: String,
        url: String,
        categories: Vec<String>,
        character_count: usize,
    },
}
