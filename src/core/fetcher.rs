use crate::domain::model::{LookbackWindow, Paper};
use crate::domain::ports::PaperSource;

struct QueryPlan {
    source: Box<dyn PaperSource>,
    queries: Vec<String>,
}

/// Runs every configured query against its source, one request at a time.
///
/// A failing query is logged and contributes nothing; it never fails the fetch.
/// Output order is source registration order, then query order.
#[derive(Default)]
pub struct Fetcher {
    plans: Vec<QueryPlan>,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<P>(mut self, source: P, queries: Vec<String>) -> Self
    where
        P: PaperSource + 'static,
    {
        self.plans.push(QueryPlan {
            source: Box::new(source),
            queries,
        });
        self
    }

    pub fn query_count(&self) -> usize {
        self.plans.iter().map(|plan| plan.queries.len()).sum()
    }

    pub async fn fetch_all(&self, window: &LookbackWindow) -> Vec<Paper> {
        let mut papers = Vec::new();

        for plan in &self.plans {
            let source = plan.source.source();
            tracing::info!("🔎 Searching {} ({} queries)", source, plan.queries.len());

            for query in &plan.queries {
                match plan.source.search(query, window).await {
                    Ok(mut found) => {
                        tracing::info!("  '{}' → {} results", query, found.len());
                        papers.append(&mut found);
                    }
                    Err(e) => {
                        tracing::warn!("  {} query '{}' failed, skipping: {}", source, query, e);
                    }
                }
            }
        }

        papers
    }
}
