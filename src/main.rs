//! Neon client
//!
//! Loads the Neon endpoints from the environment, reports what is missing
//! and optionally probes both services.

use anyhow::Result;
use clap::Parser;
use neon_client::{config::Settings, initialize_with, logging::init_tracing};

/// Neon client configuration check
#[derive(Parser, Debug)]
#[command(name = "neon-client")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Contact both services and exit non-zero if either is unhealthy
    #[arg(long)]
    probe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logging, so we can use log_level)
    let mut settings = Settings::load()?;

    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    init_tracing(&settings.log_level, args.json_logs)?;

    let client = initialize_with(&settings);

    tracing::info!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        auth_url = %client.config().auth.url,
        data_api_url = %client.config().data_api.url,
        complete = settings.is_complete(),
        "Neon client initialized"
    );

    if args.probe {
        let health = client.health().await;
        tracing::info!(auth = health.auth, data_api = health.data_api, "Health probe finished");

        if !health.all_healthy() {
            anyhow::bail!(
                "Unhealthy services: auth={}, data_api={}",
                health.auth,
                health.data_api
            );
        }
    }

    Ok(())
}
