use async_trait::async_trait;
use chrono::NaiveDate;

use crate::adapters::arxiv::ArxivSource;
use crate::adapters::gmail::GmailMailer;
use crate::adapters::http_client;
use crate::adapters::semantic_scholar::SemanticScholarSource;
use crate::config::{DigestConfig, ExecutionMode};
use crate::core::fetcher::Fetcher;
use crate::core::rank::{KeywordScorer, Ranker};
use crate::core::render::DigestRenderer;
use crate::core::{DeliveryReceipt, Digest, LookbackWindow, Paper, Pipeline, Storage};
use crate::utils::error::Result;

enum Delivery {
    Preview {
        output_path: String,
    },
    Gmail {
        mailer: GmailMailer,
        recipient: String,
    },
}

/// arXiv + Semantic Scholar → rank → HTML → preview file or Gmail.
pub struct DigestPipeline<S: Storage> {
    storage: S,
    fetcher: Fetcher,
    ranker: Ranker,
    renderer: DigestRenderer,
    delivery: Delivery,
    today: NaiveDate,
}

impl<S: Storage> DigestPipeline<S> {
    pub fn new(
        storage: S,
        config: &DigestConfig,
        mode: ExecutionMode,
        today: NaiveDate,
    ) -> Result<Self> {
        let client = http_client()?;
        let window = LookbackWindow::ending(today, config.lookback_days());

        let fetcher = Fetcher::new()
            .with_source(
                ArxivSource::new(
                    client.clone(),
                    config.endpoints.arxiv.as_str(),
                    config.queries.arxiv_max_results,
                ),
                config.queries.arxiv.clone(),
            )
            .with_source(
                SemanticScholarSource::new(
                    client.clone(),
                    config.endpoints.semantic_scholar.as_str(),
                    config.queries.semantic_scholar_limit,
                ),
                config.queries.semantic_scholar.clone(),
            );

        let scorer = KeywordScorer::new(
            &config.ranking.keywords,
            config.ranking.title_weight,
            config.ranking.abstract_weight,
        )?;

        let delivery = match mode {
            ExecutionMode::DryRun { output_path } => Delivery::Preview { output_path },
            ExecutionMode::Live {
                credentials,
                recipient,
            } => Delivery::Gmail {
                mailer: GmailMailer::new(
                    client,
                    config.endpoints.oauth_token.as_str(),
                    config.endpoints.gmail_send.as_str(),
                    credentials,
                ),
                recipient,
            },
        };

        Ok(Self {
            storage,
            fetcher,
            ranker: Ranker::new(scorer, window),
            renderer: DigestRenderer::new(config.lookback_days(), config.top_n()),
            delivery,
            today,
        })
    }
}

#[async_trait]
impl<S: Storage> Pipeline for DigestPipeline<S> {
    async fn extract(&self) -> Result<Vec<Paper>> {
        tracing::debug!(
            "Fetching {} queries for window {} to {}",
            self.fetcher.query_count(),
            self.ranker.window().start,
            self.ranker.window().end
        );
        Ok(self.fetcher.fetch_all(self.ranker.window()).await)
    }

    async fn transform(&self, papers: Vec<Paper>) -> Result<Digest> {
        let ranked = self.ranker.rank(papers);
        let digest = self.renderer.render(&ranked, self.today);

        for paper in ranked.iter().take(digest.paper_count) {
            tracing::info!("  [{}] {}  ({})", paper.score, paper.title, paper.published);
        }
        Ok(digest)
    }

    async fn load(&self, digest: Digest) -> Result<DeliveryReceipt> {
        match &self.delivery {
            Delivery::Preview { output_path } => {
                tracing::info!("[DRY RUN] Would send email. Saving HTML to {}", output_path);
                let path = self
                    .storage
                    .write_file(output_path, digest.html.as_bytes())
                    .await?;
                Ok(DeliveryReceipt::Saved { path })
            }
            Delivery::Gmail { mailer, recipient } => {
                tracing::info!("📧 Sending \"{}\" to {}", digest.subject, recipient);
                let message_id = mailer
                    .send_html(recipient, &digest.subject, &digest.html)
                    .await?;
                Ok(DeliveryReceipt::Sent {
                    message_id,
                    recipient: recipient.clone(),
                })
            }
        }
    }
}
