pub mod cli;
pub mod digest;
pub mod mode;

pub use digest::{DigestConfig, MAX_DIGEST_ENTRIES};
pub use mode::{ExecutionMode, GmailCredentials};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

/// Every flag is optional; a bare `kernel-digest` runs the default query set.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "kernel-digest")]
#[command(about = "Daily research digest for kernel fusion, CuTe DSL and CUTLASS papers")]
pub struct CliConfig {
    /// Optional TOML file overriding queries, keywords, window and endpoints
    #[arg(long, env = "DIGEST_CONFIG")]
    pub config: Option<String>,

    /// Where the HTML preview is written when DRY_RUN is set
    #[arg(long, default_value = "digest_preview.html")]
    pub output: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output", &self.output)?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        Ok(())
    }
}
