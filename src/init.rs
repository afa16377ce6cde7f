//! Client initialization
//!
//! Builds the Neon client from settings. Missing endpoints are logged once
//! and never stop startup; the handle reports them on first use.

use std::sync::OnceLock;

use crate::client::{create_client, ClientConfig, NeonClient};
use crate::config::Settings;

static SHARED: OnceLock<NeonClient> = OnceLock::new();

/// Build a client from explicit settings
///
/// Never fails. Emits one warning when either endpoint is absent.
pub fn initialize_with(settings: &Settings) -> NeonClient {
    let missing = settings.missing_endpoints();
    if !missing.is_empty() {
        tracing::warn!(
            missing = %missing.join(", "),
            "Missing {}; client will fail on first use of the affected service",
            missing.join(" or ")
        );
    }

    let config = ClientConfig::new(
        settings.auth_url.clone().unwrap_or_default(),
        settings.data_api_url.clone().unwrap_or_default(),
    )
    .with_request_timeout(settings.request_timeout())
    .with_health_check_timeout(settings.health_check_timeout());

    create_client(config)
}

/// Build a client from the process environment
///
/// Settings that fail validation are logged and replaced by defaults so the
/// application still boots.
pub fn initialize() -> NeonClient {
    let settings = Settings::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Invalid client settings, using defaults");
        Settings {
            auth_url: std::env::var(crate::config::AUTH_URL_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            data_api_url: std::env::var(crate::config::DATA_API_URL_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            ..Settings::default()
        }
    });

    initialize_with(&settings)
}

/// The process-wide client, built from the environment on first access
pub fn shared() -> &'static NeonClient {
    SHARED.get_or_init(initialize)
}
