//! Tracing setup for the binary

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `log_level`. Returns an error if a
/// subscriber is already installed.
pub fn init_tracing(log_level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let layer = if json {
        fmt::layer().json().with_filter(filter).boxed()
    } else {
        fmt::layer().with_target(false).with_filter(filter).boxed()
    };

    tracing_subscriber::registry().with(layer).try_init()?;

    Ok(())
}
