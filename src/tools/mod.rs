pub mod arxiv;
pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod retrieval;
pub mod text;
pub mod web_fetch;
pub mod web_search;
pub mod wikipedia;

// Re-export commonly used items
pub use arxiv::ArxivClient;
pub use config::SkillConfig;
pub use core::ToolResult;
pub use errors::SkillError;
pub use retrieval::RetrievalOrchestrator;
pub use web_fetch::PageFetcher;
pub use web_search::SearchProvider;
pub use wikipedia::WikipediaClient;
