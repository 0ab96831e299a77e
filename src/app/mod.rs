pub mod pipelines;

use chrono::{NaiveDate, Utc};

use crate::config::cli::LocalStorage;
use crate::config::{DigestConfig, ExecutionMode};
use crate::core::engine::DigestEngine;
use crate::domain::model::DeliveryReceipt;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use self::pipelines::digest_pipeline::DigestPipeline;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_path: String,
    pub today: NaiveDate,
}

impl RunOptions {
    pub fn new(output_path: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            today: Utc::now().date_naive(),
        }
    }
}

/// One full digest run.
///
/// Configuration and credentials are checked before the first request goes
/// out; after that, only delivery can fail the run.
pub async fn run<F>(mut config: DigestConfig, options: &RunOptions, lookup: F) -> Result<DeliveryReceipt>
where
    F: Fn(&str) -> Option<String>,
{
    config.apply_env_overrides(&lookup)?;
    config.validate()?;
    let mode = ExecutionMode::from_lookup(&lookup, &options.output_path)?;

    tracing::info!(
        "Lookback: {} days | Mode: {}",
        config.lookback_days(),
        if mode.is_dry_run() { "dry run" } else { "live" }
    );
    if let ExecutionMode::Live { recipient, .. } = &mode {
        tracing::debug!("Recipient: {}", recipient);
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = DigestPipeline::new(storage, &config, mode, options.today)?;
    DigestEngine::new(pipeline).run().await
}
