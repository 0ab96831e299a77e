use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::adapters::{collapse_whitespace, truncate_chars};
use crate::domain::model::{LookbackWindow, Paper, Source};
use crate::domain::ports::PaperSource;
use crate::utils::error::{DigestError, Result};

const MAX_ABSTRACT_CHARS: usize = 500;
const MAX_AUTHORS: usize = 5;

#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Client,
    endpoint: String,
    max_results: usize,
}

impl ArxivSource {
    pub fn new(client: Client, endpoint: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            max_results,
        }
    }

    /// The user's query with the window expressed as a `submittedDate` range.
    pub fn search_query(query: &str, window: &LookbackWindow) -> String {
        format!(
            "({}) AND submittedDate:[{}0000 TO {}2359]",
            query,
            window.start.format("%Y%m%d"),
            window.end.format("%Y%m%d")
        )
    }

    fn request_url(&self, query: &str, window: &LookbackWindow) -> Result<Url> {
        let max_results = self.max_results.to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("search_query", Self::search_query(query, window).as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ],
        )
        .map_err(|e| DigestError::InvalidConfigValueError {
            field: "endpoints.arxiv".to_string(),
            value: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PaperSource for ArxivSource {
    fn source(&self) -> Source {
        Source::ArXiv
    }

    async fn search(&self, query: &str, window: &LookbackWindow) -> Result<Vec<Paper>> {
        let url = self.request_url(query, window)?;
        tracing::debug!("arXiv request: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::SourceStatusError {
                origin: Source::ArXiv.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_feed(&body)
    }
}

pub fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
    let feed: AtomFeed = from_str(xml)?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(AtomEntry::into_paper)
        .collect())
}

/// `http://arxiv.org/abs/2501.01234v2` -> `arxiv:2501.01234`
fn arxiv_identifier(entry_id: &str) -> Option<String> {
    let (_, id) = entry_id.split_once("/abs/")?;
    let id = match id.rsplit_once('v') {
        Some((base, version))
            if !version.is_empty() && version.chars().all(|c| c.is_ascii_digit()) =>
        {
            base
        }
        _ => id,
    };
    Some(format!("arxiv:{}", id))
}

fn parse_published(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

// Atom feed model

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AtomFeed {
    #[serde(rename = "entry")]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AtomEntry {
    id: String,
    title: String,
    summary: String,
    published: String,
    #[serde(rename = "author")]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "category")]
    categories: Vec<AtomCategory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AtomAuthor {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AtomCategory {
    #[serde(rename = "@term")]
    term: String,
}

impl AtomEntry {
    fn into_paper(self) -> Option<Paper> {
        let url = self.id.trim().to_string();
        // arXiv reports query errors as a feed entry pointing at its error docs.
        if url.is_empty() || url.contains("/api/errors") {
            tracing::warn!("arXiv returned an error entry: {}", collapse_whitespace(&self.summary));
            return None;
        }

        let title = collapse_whitespace(&self.title);
        if title.is_empty() {
            return None;
        }

        let Some(published) = parse_published(&self.published) else {
            tracing::debug!("Skipping arXiv entry with unreadable date: {}", title);
            return None;
        };

        let mut paper = Paper::new(title, url, published, Source::ArXiv);
        paper.identifier = arxiv_identifier(&paper.url);
        paper.abstract_text = truncate_chars(&collapse_whitespace(&self.summary), MAX_ABSTRACT_CHARS);
        paper.authors = self
            .authors
            .into_iter()
            .map(|a| collapse_whitespace(&a.name))
            .filter(|name| !name.is_empty())
            .take(MAX_AUTHORS)
            .collect();
        paper.categories = self
            .categories
            .into_iter()
            .map(|c| c.term)
            .filter(|term| !term.is_empty())
            .collect();
        Some(paper)
    }
}
