pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, DigestConfig, ExecutionMode, GmailCredentials};

pub use crate::app::pipelines::digest_pipeline::DigestPipeline;
pub use crate::app::{run, RunOptions};
pub use crate::core::engine::DigestEngine;
pub use crate::domain::model::{DeliveryReceipt, Digest, LookbackWindow, Paper, Source};
pub use crate::utils::error::{DigestError, Result};
