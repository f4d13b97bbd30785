use feed_rs::model::Entry;
use log::{error, info};
use std::sync::Arc;

use super::config::{SkillConfig, ARXIV_RESULT_CAP};
use super::errors::SkillError;
use super::text::truncate_with;
use crate::api_models::{Paper, PaperLookup, PaperLookupReport, PaperSearchReport};
use crate::client::HttpTransport;

pub const ABSTRACT_TRUNCATION_MARKER: &str = "\n\n[... Content truncated]";

/// Client for the arXiv Atom query API.
pub struct ArxivClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    result_cap: usize,
}

impl ArxivClient {
    pub fn new(config: &SkillConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            endpoint: config.arxiv_endpoint.clone(),
            result_cap: config.arxiv_result_cap.min(ARXIV_RESULT_CAP),
        }
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<PaperSearchReport, SkillError> {
        let limit = max_results.min(self.result_cap);
        let url = format!(
            "{}?search_query={}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            self.endpoint,
            urlencoding::encode(query),
            limit
        );

        let entries = self.query(&url).await.map_err(|e| {
            error!("ArXiv search error: {}", e);
            e
        })?;

        let results: Vec<Paper> = entries
            .into_iter()
            .filter_map(paper_from_entry)
            .take(limit)
            .enumerate()
            .map(|(position, mut paper)| {
                paper.index = Some(position + 1);
                paper
            })
            .collect();

        info!(
            "ArXiv search completed: {} results for '{}'",
            results.len(),
            query
        );
        Ok(PaperSearchReport {
            query: query.to_string(),
            result_count: results.len(),
            results,
        })
    }

    /// Looks up comma separated ids. Ids arXiv does not return are reported
    /// as missing entries rather than failing the call.
    pub async fn get_papers(&self, paper_ids: &str, max_length: usize) -> Result<PaperLookupReport, SkillError> {
        let requested: Vec<String> = paper_ids
            .split(',')
            .map(normalize_paper_id)
            .filter(|id| !id.is_empty())
            .collect();
        if requested.is_empty() {
            return Err(SkillError::invalid_input("No paper IDs given"));
        }

        let url = format!(
            "{}?id_list={}&max_results={}",
            self.endpoint,
            urlencoding::encode(&requested.join(",")),
            requested.len()
        );
        let entries = self.query(&url).await.map_err(|e| {
            error!("ArXiv paper retrieval error: {}", e);
            e
        })?;

        let found: Vec<Paper> = entries
            .into_iter()
            .filter_map(paper_from_entry)
            .map(|mut paper| {
                paper.summary = truncate_with(paper.summary, max_length, ABSTRACT_TRUNCATION_MARKER);
                paper
            })
            .collect();

        let missing: Vec<PaperLookup> = requested
            .iter()
            .filter(|id| !found.iter().any(|paper| same_paper(&paper.paper_id, id)))
            .map(|id| PaperLookup::Missing {
                paper_id: id.clone(),
                error: format!("Paper not found: {}", id),
            })
            .collect();

        let papers: Vec<PaperLookup> = found
            .into_iter()
            .map(PaperLookup::Found)
            .chain(missing)
            .collect();

        info!("ArXiv paper retrieval: {} paper(s)", papers.len());
        Ok(PaperLookupReport {
            papers_retrieved: papers.len(),
            papers,
        })
    }

    async fn query(&self, url: &str) -> Result<Vec<Entry>, SkillError> {
        let response = self.transport.get_ok(url).await?;
        let feed = feed_rs::parser::parse(response.body.as_bytes())
            .map_err(|e| SkillError::parse("Atom", e))?;
        Ok(feed.entries)
    }
}

/// Accepts bare ids as well as abs/pdf URLs.
fn normalize_paper_id(raw: &str) -> String {
    let raw = raw.trim();
    let id = ["/abs/", "/pdf/"]
        .iter()
        .find_map(|marker| raw.split_once(marker).map(|(_, rest)| rest))
        .unwrap_or(raw);
    id.trim_end_matches(".pdf").trim_matches('/').to_string()
}

/// `found` may carry a version suffix the caller left off.
fn same_paper(found: &str, requested: &str) -> bool {
    if found == requested {
        return true;
    }
    found
        .strip_prefix(requested)
        .and_then(|rest| rest.strip_prefix('v'))
        .map(|version| !version.is_empty() && version.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn paper_from_entry(entry: Entry) -> Option<Paper> {
    // query errors come back as a single entry under /api/errors
    if entry.id.contains("/api/errors") {
        return None;
    }

    let paper_id = normalize_paper_id(&entry.id);
    let title = entry
        .title
        .map(|t| t.content.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    let authors = entry
        .authors
        .iter()
        .map(|person| person.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let published = entry
        .published
        .or(entry.updated)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let summary = entry
        .summary
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();
    let pdf_url = entry
        .links
        .iter()
        .find(|link| {
            link.title.as_deref() == Some("pdf")
                || link.media_type.as_deref() == Some("application/pdf")
        })
        .map(|link| link.href.clone());
    let categories = entry.categories.iter().map(|c| c.term.clone()).collect();

    Some(Paper {
        index: None,
        url: format!("https://arxiv.org/abs/{}", paper_id),
        paper_id,
        title,
        authors,
        published,
        summary,
        pdf_url,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <id>http://arxiv.org/api/query</id>
  <title type="html">ArXiv Query</title>
  <updated>2024-01-01T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on recurrent networks.  </summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/hep-th/9901001v1</id>
    <updated>1999-01-01T00:00:00Z</updated>
    <published>1999-01-01T00:00:00Z</published>
    <title>Old Style</title>
    <summary>Short.</summary>
    <author><name>A. Physicist</name></author>
    <category term="hep-th" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    const ERROR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>http://arxiv.org/api/query</id>
  <title>ArXiv Query</title>
  <updated>2024-01-01T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_bogus</id>
    <title>Error</title>
    <summary>incorrect id format for bogus</summary>
    <updated>2024-01-01T00:00:00-05:00</updated>
  </entry>
</feed>"#;

    fn client(transport: &Arc<MockTransport>) -> ArxivClient {
        ArxivClient::new(&SkillConfig::default(), transport.clone())
    }

    #[tokio::test]
    async fn search_maps_entries_to_papers() {
        let transport = Arc::new(MockTransport::new().page(
            "https://export.arxiv.org/api/query",
            200,
            "application/atom+xml",
            FEED,
        ));
        let report = client(&transport).search("attention", 5).await.unwrap();

        assert_eq!(report.result_count, 2);
        let paper = &report.results[0];
        assert_eq!(paper.index, Some(1));
        assert_eq!(paper.paper_id, "1706.03762v7");
        assert_eq!(paper.title, "Attention Is All You Need");
        assert_eq!(paper.authors, "Ashish Vaswani, Noam Shazeer");
        assert_eq!(paper.published, "2017-06-12");
        assert_eq!(paper.url, "https://arxiv.org/abs/1706.03762v7");
        assert_eq!(paper.pdf_url.as_deref(), Some("http://arxiv.org/pdf/1706.03762v7"));
        assert_eq!(paper.categories, vec!["cs.CL", "cs.LG"]);
        assert!(paper.summary.starts_with("The dominant"));

        assert_eq!(report.results[1].paper_id, "hep-th/9901001v1");
        assert_eq!(report.results[1].pdf_url, None);
    }

    #[tokio::test]
    async fn search_clamps_to_twenty() {
        let transport = Arc::new(MockTransport::new().html("https://export.arxiv.org/", FEED));
        client(&transport).search("graphs", 100).await.unwrap();

        let call = &transport.calls()[0];
        assert!(call.contains("search_query=graphs"));
        assert!(call.contains("max_results=20"));
    }

    #[tokio::test]
    async fn configured_cap_cannot_exceed_twenty() {
        let transport = Arc::new(MockTransport::new().html("https://export.arxiv.org/", FEED));
        let config = SkillConfig {
            arxiv_result_cap: 100,
            ..SkillConfig::default()
        };
        ArxivClient::new(&config, transport.clone())
            .search("graphs", 60)
            .await
            .unwrap();

        assert!(transport.calls()[0].contains("max_results=20&"));
    }

    #[tokio::test]
    async fn lookup_reports_missing_ids_and_truncates() {
        let transport = Arc::new(MockTransport::new().html("https://export.arxiv.org/", FEED));
        let report = client(&transport)
            .get_papers("1706.03762, https://arxiv.org/abs/hep-th/9901001,2401.00001", 10)
            .await
            .unwrap();

        assert_eq!(report.papers_retrieved, 3);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["papers"][0]["paper_id"], "1706.03762v7");
        assert_eq!(
            json["papers"][0]["abstract"],
            format!("The domina{}", ABSTRACT_TRUNCATION_MARKER)
        );
        assert_eq!(json["papers"][1]["abstract"], "Short.");
        assert_eq!(json["papers"][2]["paper_id"], "2401.00001");
        assert_eq!(json["papers"][2]["error"], "Paper not found: 2401.00001");

        assert!(transport.calls()[0].contains("id_list=1706.03762%2Chep-th%2F9901001%2C2401.00001"));
    }

    #[tokio::test]
    async fn error_entries_are_not_papers() {
        let transport = Arc::new(MockTransport::new().html("https://export.arxiv.org/", ERROR_FEED));
        let report = client(&transport).get_papers("bogus", 100).await.unwrap();

        assert_eq!(report.papers_retrieved, 1);
        assert!(matches!(&report.papers[0], PaperLookup::Missing { paper_id, .. } if paper_id == "bogus"));
    }

    #[tokio::test]
    async fn empty_id_list_is_invalid_input() {
        let transport = Arc::new(MockTransport::new());
        let err = client(&transport).get_papers(" , ", 100).await.unwrap_err();
        assert_eq!(err, SkillError::invalid_input("No paper IDs given"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn unparseable_body_is_an_error() {
        let transport = Arc::new(MockTransport::new().html("https://export.arxiv.org/", "not xml at all"));
        let err = client(&transport).search("x", 5).await.unwrap_err();
        assert!(err.to_string().starts_with("ParseError"));
    }

    #[test]
    fn versioned_ids_match_unversioned_requests() {
        assert!(same_paper("2301.12345v2", "2301.12345"));
        assert!(same_paper("2301.12345v2", "2301.12345v2"));
        assert!(!same_paper("2301.123456v1", "2301.12345"));
        assert!(!same_paper("2301.12345v", "2301.12345"));
    }

    #[test]
    fn ids_are_normalized_from_urls() {
        assert_eq!(normalize_paper_id(" 2301.12345 "), "2301.12345");
        assert_eq!(normalize_paper_id("https://arxiv.org/pdf/2301.12345v1.pdf"), "2301.12345v1");
        assert_eq!(normalize_paper_id("http://arxiv.org/abs/hep-th/9901001v1"), "hep-th/9901001v1");
    }
}
