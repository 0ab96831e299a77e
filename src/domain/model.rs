use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    ArXiv,
    SemanticScholar,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::ArXiv => write!(f, "arXiv"),
            Source::SemanticScholar => write!(f, "Semantic Scholar"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub url: String,
    pub published: NaiveDate,
    pub source: Source,
    /// `arxiv:<id>` or `doi:<doi>`, shared across sources when both know the paper.
    pub identifier: Option<String>,
    pub venue: Option<String>,
    pub categories: Vec<String>,
    pub score: u32,
}

impl Paper {
    pub fn new(title: String, url: String, published: NaiveDate, source: Source) -> Self {
        Self {
            title,
            abstract_text: String::new(),
            authors: Vec::new(),
            url,
            published,
            source,
            identifier: None,
            venue: None,
            categories: Vec::new(),
            score: 0,
        }
    }

    /// Dedup key: lowercased with runs of whitespace collapsed.
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Inclusive date range `[end - days, end]`, clamped at the earliest representable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    pub fn ending(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Rendered email: subject line plus HTML body.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub subject: String,
    pub html: String,
    pub paper_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryReceipt {
    Saved { path: String },
    Sent { message_id: String, recipient: String },
}

impl fmt::Display for DeliveryReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryReceipt::Saved { path } => write!(f, "preview saved to {}", path),
            DeliveryReceipt::Sent {
                message_id,
                recipient,
            } => write!(f, "sent to {} (message id {})", recipient, message_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_title_ignores_case_and_spacing() {
        assert_eq!(
            normalize_title("CuTe DSL for Kernel Fusion"),
            normalize_title("cute dsl for  kernel\nfusion  ")
        );
        assert_eq!(normalize_title("  A   B "), "a b");
    }

    #[test]
    fn test_lookback_window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let window = LookbackWindow::ending(today, 3);

        assert_eq!(window.start, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(window.days(), 3);
        assert!(window.contains(today));
        assert!(window.contains(window.start));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2026, 10, 13).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
    }

    #[test]
    fn test_huge_lookback_clamps_instead_of_overflowing() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let window = LookbackWindow::ending(today, u32::MAX);

        assert_eq!(window.start, NaiveDate::MIN);
        assert!(window.contains(today));
    }
}
