use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; WebSearchSkill/1.0)";

/// Per-request timeout. Fixed, not configurable.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Hard ceilings; config values can only lower them.
pub const SEARCH_RESULT_CAP: usize = 10;
pub const ARXIV_RESULT_CAP: usize = 20;

/// Runtime settings shared by every tool for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    pub user_agent: String,
    pub max_redirects: usize,
    pub search_result_cap: usize,
    pub arxiv_result_cap: usize,
    pub duckduckgo_endpoint: String,
    pub arxiv_endpoint: String,
    /// Action API URL, `{lang}` is replaced with the language code.
    pub wikipedia_endpoint: String,
    pub default_language: String,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            search_result_cap: SEARCH_RESULT_CAP,
            arxiv_result_cap: ARXIV_RESULT_CAP,
            duckduckgo_endpoint: "https://html.duckduckgo.com/html/".to_string(),
            arxiv_endpoint: "https://export.arxiv.org/api/query".to_string(),
            wikipedia_endpoint: "https://{lang}.wikipedia.org/w/api.php".to_string(),
            default_language: "en".to_string(),
        }
    }
}

impl SkillConfig {
    /// Reads `explicit` if given, else the per-user config file when present,
    /// else returns defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SkillConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn wikipedia_api(&self, language: &str) -> String {
        self.wikipedia_endpoint.replace("{lang}", language)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("skill-search").join("config.json"))
}
