//! Endpoint resolution
//!
//! Raw endpoint strings are kept as configured and only checked when a
//! request is about to be sent.

use reqwest::Url;

use crate::error::{NeonClientError, Result, Service};

/// A configured service base URL
#[derive(Debug, Clone)]
pub struct Endpoint {
    service: Service,
    raw: String,
}

impl Endpoint {
    pub fn new(service: Service, raw: impl Into<String>) -> Self {
        Self {
            service,
            raw: raw.into(),
        }
    }

    /// The value as configured, possibly empty
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_configured(&self) -> bool {
        !self.raw.trim().is_empty()
    }

    /// Parse the base URL, failing on empty or malformed values
    pub fn base(&self) -> Result<Url> {
        if !self.is_configured() {
            return Err(NeonClientError::MissingEndpoint {
                service: self.service,
            });
        }

        let url = Url::parse(self.raw.trim()).map_err(|e| self.invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(self.invalid(format!("unsupported scheme '{}'", other))),
        }
    }

    /// Append a path below the base URL
    ///
    /// The base path is preserved even without a trailing slash, and any
    /// query string on the base stays in place.
    pub fn url(&self, path: &str) -> Result<Url> {
        let mut url = self.base()?;
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| self.invalid("cannot be a base URL".to_string()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    fn invalid(&self, reason: String) -> NeonClientError {
        NeonClientError::InvalidEndpoint {
            service: self.service,
            url: self.raw.clone(),
            reason,
        }
    }
}
