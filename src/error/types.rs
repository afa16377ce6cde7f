//! Client error types

use std::fmt;
use thiserror::Error;

/// The remote service a request was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    DataApi,
}

impl Service {
    /// Environment variable that configures this service's endpoint
    pub fn env_var(&self) -> &'static str {
        match self {
            Service::Auth => crate::config::AUTH_URL_VAR,
            Service::DataApi => crate::config::DATA_API_URL_VAR,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Auth => write!(f, "auth"),
            Service::DataApi => write!(f, "data API"),
        }
    }
}

#[derive(Error, Debug)]
pub enum NeonClientError {
    #[error("Missing {service} endpoint: set {var}", var = .service.env_var())]
    MissingEndpoint { service: Service },

    #[error("Invalid {service} endpoint '{url}': {reason}")]
    InvalidEndpoint {
        service: Service,
        url: String,
        reason: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not signed in")]
    NotAuthenticated,
}

impl NeonClientError {
    /// Check if this error comes from configuration rather than the network
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NeonClientError::MissingEndpoint { .. } | NeonClientError::InvalidEndpoint { .. }
        )
    }

    /// HTTP status of a remote rejection, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            NeonClientError::Api { status, .. } => Some(*status),
            NeonClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NeonClientError>;
