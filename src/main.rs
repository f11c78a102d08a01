use anyhow::{Context, Result};
use tracing::{info, warn};
use tx_language_sync::{config::Config, reconcile, transifex::TransifexClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tx_language_sync=info".parse()?),
        )
        .init();

    info!("Starting Transifex language sync");

    // Load configuration from environment
    let config = Config::from_env()?;
    if config.dry_run {
        info!("Dry run: no languages will be added");
    }

    let client = TransifexClient::new(&config).context("Failed to build Transifex client")?;
    info!(
        "Organization {} (exclusion mode: {}, excluded locale: {})",
        client.organization(),
        config.exclusion_mode,
        config.excluded_language
    );

    let report = reconcile::sync(&client, &config)
        .await
        .context("Language sync aborted")?;

    if !report.is_success() {
        for failure in &report.failures {
            warn!(
                "{} / {}: {}",
                failure.project, failure.language_id, failure.error
            );
        }
        anyhow::bail!(
            "{} of {} language additions failed",
            report.failures.len(),
            report.planned
        );
    }

    info!("Language sync finished successfully!");
    Ok(())
}
