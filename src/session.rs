use log::{debug, warn};
use std::sync::Arc;

use crate::cli::{ArxivArgs, Command, WebArgs, WikipediaArgs};
use crate::client::{HttpTransport, ReqwestTransport};
use crate::tools::{
    ArxivClient, PageFetcher, RetrievalOrchestrator, SearchProvider, SkillConfig, SkillError,
    ToolResult, WikipediaClient,
};

/// One invocation: a config, a transport, and a command to dispatch.
pub struct SkillSession {
    config: SkillConfig,
    transport: Arc<dyn HttpTransport>,
}

impl SkillSession {
    pub fn new(config: SkillConfig) -> Result<Self, SkillError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: SkillConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub async fn run(&self, command: &Command) -> ToolResult {
        match command {
            Command::Web(args) => self.web(args).await,
            Command::Arxiv(args) => self.arxiv(args).await,
            Command::Wikipedia(args) => self.wikipedia(args).await,
        }
    }

    async fn web(&self, args: &WebArgs) -> ToolResult {
        if let Some(url) = &args.fetch_url {
            let fetcher = PageFetcher::new(self.transport.clone());
            let outcome = fetcher.fetch(url, args.include_html, args.max_length).await;
            return ToolResult::new(outcome.success, &outcome);
        }

        let query = match required("query", args.query.as_deref()) {
            Ok(query) => query,
            Err(e) => return ToolResult::failure(&e),
        };

        let search = match SearchProvider::from_config(&self.config, self.transport.clone()) {
            Ok(search) => search,
            Err(e) => {
                warn!("{}", e);
                return ToolResult::failure(&e).with_context("query", query);
            }
        };

        let result = if args.fetch_content {
            debug!("Search and fetch: top {} of {} results", args.top_n, args.max_results);
            let fetcher = PageFetcher::new(self.transport.clone());
            RetrievalOrchestrator::new(search, fetcher)
                .search_and_fetch(query, args.max_results, args.top_n, args.max_length)
                .await
                .map(|report| ToolResult::ok(&report))
        } else {
            search
                .search(query, args.max_results)
                .await
                .map(|report| ToolResult::ok(&report))
        };

        result.unwrap_or_else(|e| ToolResult::failure(&e).with_context("query", query))
    }

    async fn arxiv(&self, args: &ArxivArgs) -> ToolResult {
        let client = ArxivClient::new(&self.config, self.transport.clone());

        if let Some(ids) = &args.paper_ids {
            return match client.get_papers(ids, args.max_length).await {
                Ok(report) => ToolResult::ok(&report),
                Err(e) => ToolResult::failure(&e).with_context("paper_ids", ids.as_str()),
            };
        }

        let query = match required("query", args.query.as_deref()) {
            Ok(query) => query,
            Err(e) => return ToolResult::failure(&e),
        };
        match client.search(query, args.max_results).await {
            Ok(report) => ToolResult::ok(&report),
            Err(e) => ToolResult::failure(&e).with_context("query", query),
        }
    }

    async fn wikipedia(&self, args: &WikipediaArgs) -> ToolResult {
        let client = WikipediaClient::new(&self.config, self.transport.clone());
        let language = args
            .language
            .as_deref()
            .unwrap_or(&self.config.default_language);

        if let Some(title) = &args.title {
            let title = title.trim();
            return match client
                .get_article(title, args.summary_only, args.max_length, language)
                .await
            {
                Ok(report) => ToolResult::ok(&report),
                Err(e) => ToolResult::failure(&e).with_context("title", title),
            };
        }

        let query = match required("query", args.query.as_deref()) {
            Ok(query) => query,
            Err(e) => return ToolResult::failure(&e),
        };
        match client.search(query, language).await {
            Ok(report) => ToolResult::ok(&report),
            Err(e) => ToolResult::failure(&e).with_context("query", query),
        }
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, SkillError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SkillError::invalid_input(format!("A non-empty --{} is required", name))),
    }
}
