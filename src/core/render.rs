use chrono::NaiveDate;
use std::fmt::Write;

use crate::config::MAX_DIGEST_ENTRIES;
use crate::domain::model::{Digest, Paper};

const SNIPPET_CHARS: usize = 300;
const LISTED_AUTHORS: usize = 3;
const DIGEST_TITLE: &str = "Kernel Fusion & CuTe DSL Research Digest";

pub struct DigestRenderer {
    lookback_days: u32,
    max_entries: usize,
}

impl DigestRenderer {
    pub fn new(lookback_days: u32, max_entries: usize) -> Self {
        Self {
            lookback_days,
            max_entries: max_entries.min(MAX_DIGEST_ENTRIES),
        }
    }

    pub fn subject(date: NaiveDate) -> String {
        format!("{} — {}", DIGEST_TITLE, date.format("%B %d, %Y"))
    }

    /// Renders at most `max_entries` papers, in the order given.
    pub fn render(&self, papers: &[Paper], date: NaiveDate) -> Digest {
        let shown = &papers[..papers.len().min(self.max_entries)];
        let date_str = date.format("%B %d, %Y").to_string();

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
        let _ = write!(html, "<title>{}</title></head>\n", escape_html(&Self::subject(date)));
        html.push_str(
            "<body style=\"font-family: Arial, sans-serif; color: #222; max-width: 700px; margin: 0 auto;\">\n",
        );
        html.push_str(
            "<h1 style=\"color: #1a1a2e; border-bottom: 2px solid #e94560; padding-bottom: 8px;\">Kernel Fusion &amp; CuTe DSL — Research Digest</h1>\n",
        );

        if shown.is_empty() {
            let _ = write!(
                html,
                "<p class=\"empty\">No new papers found in the last {} days. Quiet weeks happen; the next digest will pick up anything new.</p>\n",
                self.lookback_days
            );
        } else {
            let _ = write!(
                html,
                "<p style=\"color: #666;\">{} · {} papers · Last {} days</p>\n",
                date_str,
                shown.len(),
                self.lookback_days
            );
            html.push_str("<table style=\"width: 100%; border-collapse: collapse;\">\n");
            for paper in shown {
                render_entry(&mut html, paper);
            }
            html.push_str("</table>\n");
        }

        html.push_str("<hr style=\"border: 1px solid #eee; margin: 24px 0;\">\n");
        html.push_str(
            "<p style=\"color: #999; font-size: 12px;\">Sources: arXiv, Semantic Scholar · Generated daily</p>\n",
        );
        html.push_str("</body></html>\n");

        Digest {
            subject: Self::subject(date),
            html,
            paper_count: shown.len(),
        }
    }
}

fn render_entry(html: &mut String, paper: &Paper) {
    let mut byline = paper
        .authors
        .iter()
        .take(LISTED_AUTHORS)
        .map(|a| escape_html(a))
        .collect::<Vec<_>>()
        .join(", ");
    if paper.authors.len() > LISTED_AUTHORS {
        byline.push_str(" et al.");
    }
    if let Some(venue) = &paper.venue {
        let _ = write!(byline, " — <em>{}</em>", escape_html(venue));
    }

    let tags: String = paper
        .categories
        .iter()
        .map(|c| format!(" <code>{}</code>", escape_html(c)))
        .collect();

    let _ = write!(
        html,
        concat!(
            "<tr class=\"paper\" style=\"border-bottom: 1px solid #eee;\"><td style=\"padding: 16px 0;\">\n",
            "<h3 style=\"margin: 0 0 4px 0;\"><a href=\"{url}\" style=\"color: #1a1a2e; text-decoration: none;\">{title}</a></h3>\n",
            "<p style=\"margin: 2px 0; color: #666; font-size: 13px;\">{byline} · {published} · ",
            "<span style=\"background: #f0f0f0; padding: 2px 6px; border-radius: 3px; font-size: 11px;\">{source}</span>{tags}</p>\n",
            "<p style=\"margin: 8px 0 0 0; font-size: 14px; color: #444;\">{snippet}</p>\n",
            "</td></tr>\n"
        ),
        url = escape_html(&paper.url),
        title = escape_html(&paper.title),
        byline = byline,
        published = paper.published.format("%Y-%m-%d"),
        source = paper.source,
        tags = tags,
        snippet = escape_html(&snippet(&paper.abstract_text)),
    );
}

fn snippet(abstract_text: &str) -> String {
    match abstract_text.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}…", &abstract_text[..idx]),
        None => abstract_text.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Source;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn paper(i: usize) -> Paper {
        let mut paper = Paper::new(
            format!("Paper {}", i),
            format!("https://arxiv.org/abs/2610.{:05}", i),
            date(),
            Source::ArXiv,
        );
        paper.authors = vec!["A".to_string(), "B".to_string()];
        paper.abstract_text = "Short abstract.".to_string();
        paper
    }

    fn entry_count(html: &str) -> usize {
        html.matches("class=\"paper\"").count()
    }

    #[test]
    fn test_empty_digest_is_valid_html() {
        let digest = DigestRenderer::new(3, 15).render(&[], date());

        assert!(digest.html.starts_with("<!DOCTYPE html>"));
        assert!(digest.html.trim_end().ends_with("</html>"));
        assert!(digest.html.contains("No new papers found in the last 3 days"));
        assert_eq!(entry_count(&digest.html), 0);
        assert_eq!(digest.paper_count, 0);
    }

    #[test]
    fn test_never_more_than_fifteen_entries() {
        let papers: Vec<Paper> = (0..40).map(paper).collect();
        let digest = DigestRenderer::new(3, 100).render(&papers, date());

        assert_eq!(entry_count(&digest.html), 15);
        assert_eq!(digest.paper_count, 15);
        assert!(digest.html.contains("Paper 14"));
        assert!(!digest.html.contains("Paper 15<"));
    }

    #[test]
    fn test_subject_contains_date() {
        let digest = DigestRenderer::new(3, 15).render(&[paper(1)], date());
        assert_eq!(
            digest.subject,
            "Kernel Fusion & CuTe DSL Research Digest — October 18, 2026"
        );
    }

    #[test]
    fn test_entry_fields() {
        let mut p = paper(7);
        p.authors = vec!["One".into(), "Two".into(), "Three".into(), "Four".into()];
        p.venue = Some("SC '26".to_string());
        p.categories = vec!["cs.DC".to_string()];
        p.abstract_text = "x".repeat(400);

        let digest = DigestRenderer::new(3, 15).render(&[p], date());
        assert!(digest.html.contains("href=\"https://arxiv.org/abs/2610.00007\""));
        assert!(digest.html.contains("One, Two, Three et al."));
        assert!(digest.html.contains("<em>SC &#39;26</em>"));
        assert!(digest.html.contains("<code>cs.DC</code>"));
        assert!(digest.html.contains(">arXiv</span>"));
        assert!(digest.html.contains(&format!("{}…", "x".repeat(300))));
        assert!(!digest.html.contains(&"x".repeat(301)));
    }

    #[test]
    fn test_api_text_is_escaped() {
        let mut p = paper(1);
        p.title = "<script>alert(1)</script> & friends".to_string();
        let digest = DigestRenderer::new(3, 15).render(&[p], date());

        assert!(!digest.html.contains("<script>"));
        assert!(digest.html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; friends"));
    }
}
