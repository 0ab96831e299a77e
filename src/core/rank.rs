use regex::Regex;
use std::collections::HashSet;

use crate::domain::model::{LookbackWindow, Paper};
use crate::utils::error::{DigestError, Result};

/// Counts whole-word, case-insensitive keyword hits; title hits weigh more.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    patterns: Vec<Regex>,
    title_weight: u32,
    abstract_weight: u32,
}

impl KeywordScorer {
    pub fn new(keywords: &[String], title_weight: u32, abstract_weight: u32) -> Result<Self> {
        let patterns = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|keyword| {
                let words = keyword
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+");
                Regex::new(&format!(r"(?i)\b{}\b", words)).map_err(|e| DigestError::ConfigError {
                    message: format!("invalid keyword '{}': {}", keyword, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            title_weight,
            abstract_weight,
        })
    }

    pub fn score(&self, paper: &Paper) -> u32 {
        self.patterns
            .iter()
            .map(|pattern| {
                let in_title = pattern.find_iter(&paper.title).count() as u32;
                let in_abstract = pattern.find_iter(&paper.abstract_text).count() as u32;
                in_title * self.title_weight + in_abstract * self.abstract_weight
            })
            .sum()
    }
}

pub fn filter_window(papers: Vec<Paper>, window: &LookbackWindow) -> Vec<Paper> {
    papers
        .into_iter()
        .filter(|p| window.contains(p.published))
        .collect()
}

/// First occurrence wins, by normalized title or by shared identifier.
pub fn deduplicate(papers: Vec<Paper>) -> Vec<Paper> {
    let mut seen_titles = HashSet::new();
    let mut seen_ids = HashSet::new();

    papers
        .into_iter()
        .filter(|paper| {
            let title_is_new = !seen_titles.contains(&paper.normalized_title());
            let id_is_new = paper
                .identifier
                .as_ref()
                .map_or(true, |id| !seen_ids.contains(id));
            if !(title_is_new && id_is_new) {
                return false;
            }
            seen_titles.insert(paper.normalized_title());
            if let Some(id) = &paper.identifier {
                seen_ids.insert(id.clone());
            }
            true
        })
        .collect()
}

/// Score descending, then newest first; stable otherwise.
pub fn sort_by_relevance(papers: &mut [Paper]) {
    papers.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.published.cmp(&a.published))
    });
}

pub struct Ranker {
    scorer: KeywordScorer,
    window: LookbackWindow,
}

impl Ranker {
    pub fn new(scorer: KeywordScorer, window: LookbackWindow) -> Self {
        Self { scorer, window }
    }

    pub fn window(&self) -> &LookbackWindow {
        &self.window
    }

    pub fn rank(&self, papers: Vec<Paper>) -> Vec<Paper> {
        let fetched = papers.len();
        let recent = filter_window(papers, &self.window);
        tracing::info!(
            "After recency filter ({}d): {} of {}",
            self.window.days(),
            recent.len(),
            fetched
        );

        let mut unique = deduplicate(recent);
        tracing::info!("After dedup: {}", unique.len());

        for paper in unique.iter_mut() {
            paper.score = self.scorer.score(paper);
        }
        sort_by_relevance(&mut unique);
        unique
    }
}
