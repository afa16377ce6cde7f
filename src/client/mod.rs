//! Neon client handle
//!
//! `create_client` never fails: endpoints are stored as given and checked
//! when an operation first needs them.

pub mod auth;
pub mod data_api;
pub mod endpoint;
pub mod query;

pub use auth::{AuthClient, Session, SessionInfo, SignInResponse, User};
pub use data_api::DataApiClient;
pub use endpoint::Endpoint;
pub use query::QueryBuilder;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NeonClientError, Result, Service};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Auth service settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthConfig {
    pub url: String,
}

/// Data API settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataApiConfig {
    pub url: String,
}

/// Configuration passed to [`create_client`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    pub auth: AuthConfig,
    pub data_api: DataApiConfig,
    #[serde(skip, default = "default_request_timeout")]
    pub request_timeout: Duration,
    #[serde(skip, default = "default_health_check_timeout")]
    pub health_check_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_health_check_timeout() -> Duration {
    DEFAULT_HEALTH_CHECK_TIMEOUT
}

impl ClientConfig {
    pub fn new(auth_url: impl Into<String>, data_api_url: impl Into<String>) -> Self {
        Self {
            auth: AuthConfig {
                url: auth_url.into(),
            },
            data_api: DataApiConfig {
                url: data_api_url.into(),
            },
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

struct Inner {
    config: ClientConfig,
    auth: Arc<AuthClient>,
    data_api: DataApiClient,
}

/// Shared handle to Neon Auth and the Neon Data API
///
/// Clones are cheap and refer to the same instance.
#[derive(Clone)]
pub struct NeonClient {
    inner: Arc<Inner>,
}

/// Create a client handle from configuration
pub fn create_client(config: ClientConfig) -> NeonClient {
    let http = match Client::builder().timeout(config.request_timeout).build() {
        Ok(http) => http,
        Err(e) => {
            // Only fails when the TLS backend cannot initialise.
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        }
    };

    let auth = Arc::new(AuthClient::new(
        http.clone(),
        Endpoint::new(Service::Auth, config.auth.url.clone()),
    ));
    let data_api = DataApiClient::new(
        http,
        Endpoint::new(Service::DataApi, config.data_api.url.clone()),
        auth.clone(),
    );

    tracing::debug!(
        auth_url = %config.auth.url,
        data_api_url = %config.data_api.url,
        "Created Neon client"
    );

    NeonClient {
        inner: Arc::new(Inner {
            config,
            auth,
            data_api,
        }),
    }
}

impl NeonClient {
    /// The configuration this handle was built with
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    pub fn data_api(&self) -> &DataApiClient {
        &self.inner.data_api
    }

    /// Shorthand for `data_api().from(table)`
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        self.inner.data_api.from(table)
    }

    /// Check if two handles refer to the same instance
    pub fn same_instance(&self, other: &NeonClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Check both services, each bounded by the health check timeout
    pub async fn health(&self) -> HealthStatus {
        let timeout = self.inner.config.health_check_timeout;
        let (auth, data_api) = tokio::join!(
            tokio::time::timeout(timeout, self.auth().health_check()),
            tokio::time::timeout(timeout, self.data_api().health_check()),
        );

        if auth.is_err() || data_api.is_err() {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                auth_timed_out = auth.is_err(),
                data_api_timed_out = data_api.is_err(),
                "Neon health check timed out"
            );
        }

        HealthStatus {
            auth: auth.unwrap_or(false),
            data_api: data_api.unwrap_or(false),
        }
    }
}

impl std::fmt::Debug for NeonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeonClient")
            .field("auth_url", &self.inner.config.auth.url)
            .field("data_api_url", &self.inner.config.data_api.url)
            .finish()
    }
}

/// Health status of both services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub auth: bool,
    pub data_api: bool,
}

impl HealthStatus {
    pub fn all_healthy(&self) -> bool {
        self.auth && self.data_api
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Turn a response into JSON, mapping non-2xx replies to `Api` errors
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: Service,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => match (body.code, body.message.or(body.error)) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (None, Some(message)) => message,
                _ => text,
            },
            Err(_) => text,
        };

        tracing::warn!(
            service = %service,
            status = status.as_u16(),
            message = %message,
            "Neon request rejected"
        );

        return Err(NeonClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(service = %service, error = %e, body = %text, "Failed to parse Neon response");
        NeonClientError::Parse(e.to_string())
    })
}
