use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Web search, page retrieval, arXiv and Wikipedia lookups with JSON output
#[derive(Parser, Debug)]
#[command(name = "skill-search")]
#[command(version)]
#[command(about = "Search the web, arXiv and Wikipedia; every result is printed as one JSON object", long_about = None)]
pub struct Cli {
    /// Pretty-print the JSON report
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Path to a JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search the web or fetch a single page
    Web(WebArgs),

    /// Search arXiv or look up papers by id
    Arxiv(ArxivArgs),

    /// Search Wikipedia or read an article
    Wikipedia(WikipediaArgs),
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["query", "fetch_url"])))]
pub struct WebArgs {
    /// Search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Fetch this URL instead of searching
    #[arg(short = 'u', long, value_name = "URL")]
    pub fetch_url: Option<String>,

    /// Number of search results (capped at 10)
    #[arg(short, long, default_value_t = 5, value_parser = positive)]
    pub max_results: usize,

    /// Include raw HTML when fetching a URL
    #[arg(long)]
    pub include_html: bool,

    /// Maximum characters of extracted text per page
    #[arg(short = 'l', long, default_value_t = 50_000, value_parser = positive)]
    pub max_length: usize,

    /// Fetch the pages behind the top results
    #[arg(short, long)]
    pub fetch_content: bool,

    /// How many top results to fetch with --fetch-content
    #[arg(short = 'n', long, default_value_t = 3, value_parser = positive)]
    pub top_n: usize,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["query", "paper_ids"])))]
pub struct ArxivArgs {
    /// Search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Comma separated arXiv ids, e.g. 2301.07041,1706.03762
    #[arg(short, long, value_name = "IDS")]
    pub paper_ids: Option<String>,

    /// Number of papers (capped at 20)
    #[arg(short, long, default_value_t = 5, value_parser = positive)]
    pub max_results: usize,

    /// Maximum abstract length for --paper-ids
    #[arg(short = 'l', long, default_value_t = 5_000, value_parser = positive)]
    pub max_length: usize,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["query", "title"])))]
pub struct WikipediaArgs {
    /// Search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Exact article title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Only return the article summary
    #[arg(short, long)]
    pub summary_only: bool,

    /// Maximum characters of full article text
    #[arg(short = 'l', long, default_value_t = 5_000, value_parser = positive)]
    pub max_length: usize,

    /// Wikipedia language edition [default: from config, "en"]
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,
}

fn positive(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a positive integer", raw)),
    }
}

/// First line of a clap error without the `error: ` prefix.
pub fn usage_error_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}
