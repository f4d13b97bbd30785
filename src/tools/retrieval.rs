use futures::future::join_all;
use log::{debug, error, info};

use super::errors::SkillError;
use super::web_fetch::PageFetcher;
use super::web_search::SearchProvider;
use crate::api_models::{FetchOutcome, FetchedPage, RetrievalReport};

/// Search, then fetch the top results concurrently.
pub struct RetrievalOrchestrator {
    search: SearchProvider,
    fetcher: PageFetcher,
}

impl RetrievalOrchestrator {
    pub fn new(search: SearchProvider, fetcher: PageFetcher) -> Self {
        Self { search, fetcher }
    }

    /// A failed search fails the whole call; failed fetches are embedded in
    /// the report as unsuccessful outcomes.
    pub async fn search_and_fetch(
        &self,
        query: &str,
        max_results: usize,
        top_n: usize,
        max_length: usize,
    ) -> Result<RetrievalReport, SkillError> {
        let search_report = self.search.search(query, max_results).await?;

        let selected: Vec<String> = search_report
            .results
            .iter()
            .take(top_n)
            .map(|result| result.link.clone())
            .collect();
        let total = selected.len();

        // one task per slot; join_all yields outputs in spawn order
        let handles = selected.iter().enumerate().map(|(slot, url)| {
            let fetcher = self.fetcher.clone();
            let url = url.clone();
            debug!("Fetching content from result {}/{}: {}", slot + 1, total, url);
            tokio::spawn(async move { fetcher.fetch(&url, false, max_length).await })
        });
        let joined = join_all(handles).await;

        let fetched_content: Vec<FetchedPage> = joined
            .into_iter()
            .zip(&selected)
            .enumerate()
            .map(|(slot, (joined, url))| {
                let outcome = joined.unwrap_or_else(|e| {
                    error!("Fetch task for {} did not complete: {}", url, e);
                    FetchOutcome::failed(url, &SkillError::other("TaskFailed", e))
                });
                FetchedPage {
                    index: slot + 1,
                    outcome,
                }
            })
            .collect();

        let succeeded = fetched_content.iter().filter(|p| p.outcome.success).count();
        info!(
            "Fetched {}/{} pages for '{}'",
            succeeded,
            fetched_content.len(),
            query
        );

        Ok(RetrievalReport {
            query: query.to_string(),
            total_results: search_report.result_count,
            fetched_count: fetched_content.len(),
            search_report,
            fetched_content,
        })
    }
}
