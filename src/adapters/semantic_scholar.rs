use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::adapters::{collapse_whitespace, truncate_chars};
use crate::domain::model::{LookbackWindow, Paper, Source};
use crate::domain::ports::PaperSource;
use crate::utils::error::{DigestError, Result};

const FIELDS: &str = "title,abstract,url,year,authors,publicationDate,venue,externalIds";
const MAX_ABSTRACT_CHARS: usize = 500;
const MAX_AUTHORS: usize = 5;

#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: Client,
    endpoint: String,
    limit: usize,
}

impl SemanticScholarSource {
    pub fn new(client: Client, endpoint: impl Into<String>, limit: usize) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            limit,
        }
    }

    /// `publicationDateOrYear` range, e.g. `2026-10-15:2026-10-18`.
    pub fn date_filter(window: &LookbackWindow) -> String {
        format!(
            "{}:{}",
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl PaperSource for SemanticScholarSource {
    fn source(&self) -> Source {
        Source::SemanticScholar
    }

    async fn search(&self, query: &str, window: &LookbackWindow) -> Result<Vec<Paper>> {
        let limit = self.limit.to_string();
        let date_filter = Self::date_filter(window);
        tracing::debug!("Semantic Scholar request: {} ({})", query, date_filter);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("fields", FIELDS),
                ("publicationDateOrYear", date_filter.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::SourceStatusError {
                origin: Source::SemanticScholar.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

pub fn parse_search_response(json: &str) -> Result<Vec<Paper>> {
    let response: SearchResponse = serde_json::from_str(json)?;
    Ok(response
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(ApiPaper::into_paper)
        .collect())
}

// Semantic Scholar response model

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<ApiPaper>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPaper {
    paper_id: Option<String>,
    title: Option<String>,
    r#abstract: Option<String>,
    url: Option<String>,
    authors: Option<Vec<ApiAuthor>>,
    publication_date: Option<String>,
    venue: Option<String>,
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct ApiAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(rename = "ArXiv")]
    arxiv: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

impl ApiPaper {
    fn into_paper(self) -> Option<Paper> {
        let title = collapse_whitespace(self.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            return None;
        }

        // A bare `year` cannot be placed inside a day-granular window.
        let Some(published) = self
            .publication_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        else {
            tracing::debug!("Skipping Semantic Scholar paper without a publication date: {}", title);
            return None;
        };

        let url = match (self.url, &self.paper_id) {
            (Some(url), _) if !url.is_empty() => url,
            (_, Some(id)) if !id.is_empty() => {
                format!("https://www.semanticscholar.org/paper/{}", id)
            }
            _ => {
                tracing::debug!("Skipping Semantic Scholar paper without a link: {}", title);
                return None;
            }
        };

        let mut paper = Paper::new(title, url, published, Source::SemanticScholar);
        paper.abstract_text = truncate_chars(
            &collapse_whitespace(self.r#abstract.as_deref().unwrap_or_default()),
            MAX_ABSTRACT_CHARS,
        );
        paper.authors = self
            .authors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.name)
            .filter(|name| !name.trim().is_empty())
            .take(MAX_AUTHORS)
            .collect();
        paper.venue = self.venue.filter(|v| !v.trim().is_empty());
        paper.identifier = self.external_ids.and_then(|ids| {
            ids.arxiv
                .map(|id| format!("arxiv:{}", id))
                .or_else(|| ids.doi.map(|doi| format!("doi:{}", doi.to_lowercase())))
        });
        Some(paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = serde_json::json!({
            "total": 3,
            "offset": 0,
            "data": [
                {
                    "paperId": "abc123",
                    "title": "Agentic CUDA Kernel Generation",
                    "abstract": "LLM agents write\n fused kernels.",
                    "url": "https://www.semanticscholar.org/paper/abc123",
                    "year": 2026,
                    "publicationDate": "2026-10-16",
                    "venue": "MLSys",
                    "authors": [
                        {"authorId": "1", "name": "A. One"},
                        {"authorId": "2", "name": "B. Two"}
                    ],
                    "externalIds": {"ArXiv": "2610.04321", "DOI": "10.1/xyz"}
                },
                {
                    "paperId": "nodate",
                    "title": "Year Only Paper",
                    "year": 2026,
                    "publicationDate": null
                },
                {
                    "paperId": "notitle",
                    "title": null,
                    "publicationDate": "2026-10-17"
                }
            ]
        })
        .to_string();

        let papers = parse_search_response(&json).unwrap();
        assert_eq!(papers.len(), 1);

        let paper = &papers[0];
        assert_eq!(paper.title, "Agentic CUDA Kernel Generation");
        assert_eq!(paper.abstract_text, "LLM agents write fused kernels.");
        assert_eq!(paper.authors, vec!["A. One", "B. Two"]);
        assert_eq!(paper.venue.as_deref(), Some("MLSys"));
        assert_eq!(paper.identifier.as_deref(), Some("arxiv:2610.04321"));
        assert_eq!(paper.published, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(paper.source, Source::SemanticScholar);
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let json = r#"{"data": [{"paperId": "p1", "title": "Tensor Compilers", "publicationDate": "2026-10-18",
            "authors": null, "abstract": null, "url": null, "venue": "",
            "externalIds": {"DOI": "10.1145/ABC"}}]}"#;
        let papers = parse_search_response(json).unwrap();

        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].url, "https://www.semanticscholar.org/paper/p1");
        assert!(papers[0].authors.is_empty());
        assert!(papers[0].abstract_text.is_empty());
        assert_eq!(papers[0].venue, None);
        assert_eq!(papers[0].identifier.as_deref(), Some("doi:10.1145/abc"));
    }

    #[test]
    fn test_paper_without_any_link_is_skipped() {
        let json = r#"{"data": [
            {"title": "Unlinked Kernel Paper", "publicationDate": "2026-10-17", "url": null},
            {"paperId": "", "title": "Blank Id Paper", "publicationDate": "2026-10-17"},
            {"paperId": "p2", "title": "Linked Kernel Paper", "publicationDate": "2026-10-17", "url": ""}
        ]}"#;
        let papers = parse_search_response(json).unwrap();

        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "Linked Kernel Paper");
        assert_eq!(papers[0].url, "https://www.semanticscholar.org/paper/p2");
    }

    #[test]
    fn test_empty_or_missing_data() {
        assert!(parse_search_response(r#"{"total": 0, "offset": 0}"#).unwrap().is_empty());
        assert!(parse_search_response(r#"{"data": null}"#).unwrap().is_empty());
        assert!(parse_search_response("not json").is_err());
    }

    #[test]
    fn test_date_filter_format() {
        let window = LookbackWindow::ending(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(), 3);
        assert_eq!(SemanticScholarSource::date_filter(&window), "2025-12-30:2026-01-02");
    }
}
