use chrono::Utc;
use clap::Parser;
use kernel_digest::utils::{logger, validation::Validate};
use kernel_digest::{run, CliConfig, DigestConfig, DigestError, RunOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Kernel Digest — {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        exit_with(&e);
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            DigestConfig::from_file(path)
        }
        None => Ok(DigestConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let options = RunOptions::new(cli.output.clone());
    match run(config, &options, |key| std::env::var(key).ok()).await {
        Ok(receipt) => {
            println!("✅ Digest {}", receipt);
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &DigestError) -> ! {
    tracing::error!(
        "❌ Digest run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
