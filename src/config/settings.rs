//! Application settings and configuration
//!
//! This module loads the Neon endpoints and client tuning knobs from
//! environment variables with sensible defaults. Missing endpoints are
//! tolerated here and only reported; the client fails on first use instead.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable holding the Neon Auth endpoint
pub const AUTH_URL_VAR: &str = "NEON_AUTH_URL";

/// Environment variable holding the Neon Data API endpoint
pub const DATA_API_URL_VAR: &str = "NEON_DATA_API_URL";

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub log_level: String,

    // Neon endpoints
    pub auth_url: Option<String>,
    pub data_api_url: Option<String>,

    // HTTP client
    pub request_timeout_seconds: u64,
    pub health_check_timeout_seconds: u64,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// `load()` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let settings = Self {
            app_name: env_or_default("APP_NAME", "neon-client"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            auth_url: non_empty(lookup(AUTH_URL_VAR)),
            data_api_url: non_empty(lookup(DATA_API_URL_VAR)),

            request_timeout_seconds: env_or_default("NEON_REQUEST_TIMEOUT_SECONDS", "30")
                .parse()
                .context("Invalid NEON_REQUEST_TIMEOUT_SECONDS value")?,
            health_check_timeout_seconds: env_or_default("NEON_HEALTH_CHECK_TIMEOUT_SECONDS", "5")
                .parse()
                .unwrap_or(5),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    ///
    /// Endpoints are deliberately not checked here.
    fn validate(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            anyhow::bail!("Request timeout must be > 0");
        }
        if self.health_check_timeout_seconds == 0 {
            anyhow::bail!("Health check timeout must be > 0");
        }

        Ok(())
    }

    /// Names of the endpoint variables that were absent or empty
    pub fn missing_endpoints(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.auth_url.is_none() {
            missing.push(AUTH_URL_VAR);
        }
        if self.data_api_url.is_none() {
            missing.push(DATA_API_URL_VAR);
        }
        missing
    }

    /// Check if both endpoints are configured
    pub fn is_complete(&self) -> bool {
        self.missing_endpoints().is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "neon-client".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            auth_url: None,
            data_api_url: None,
            request_timeout_seconds: 30,
            health_check_timeout_seconds: 5,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
