//! Neon Data API client
//!
//! The Data API speaks the PostgREST dialect below the configured data URL.
//! Requests run as the signed-in user when the auth client holds a session,
//! and anonymously otherwise.

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::auth::AuthClient;
use super::endpoint::Endpoint;
use super::query::QueryBuilder;
use super::read_json;
use crate::error::{NeonClientError, Result, Service};

/// Client for the data service
pub struct DataApiClient {
    http: Client,
    endpoint: Endpoint,
    auth: Arc<AuthClient>,
}

impl DataApiClient {
    pub(crate) fn new(http: Client, endpoint: Endpoint, auth: Arc<AuthClient>) -> Self {
        Self {
            http,
            endpoint,
            auth,
        }
    }

    /// The configured data API URL, possibly empty
    pub fn url(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Start a query against a table or view
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self, table)
    }

    /// Call a Postgres function exposed under `/rpc`
    pub async fn rpc<A: Serialize>(&self, function: &str, args: &A) -> Result<Value> {
        let body = serde_json::to_value(args).map_err(|e| NeonClientError::Parse(e.to_string()))?;
        let path = format!("rpc/{}", function);
        self.send(Method::POST, &path, &[], Some(body), false).await
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
        return_representation: bool,
    ) -> Result<Value> {
        let url = self.endpoint.url(path)?;

        tracing::debug!(
            method = %method,
            url = %url,
            params = query.len(),
            "Calling Neon Data API"
        );

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let jwt = self.auth.access_token().await?;
        if let Some(jwt) = &jwt {
            request = request.bearer_auth(jwt);
        }
        if return_representation {
            request = request.header("Prefer", "return=representation");
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let result = read_json(Service::DataApi, response).await;

        // Drop a rejected JWT so the next call mints a fresh one.
        if jwt.is_some() && matches!(result, Err(NeonClientError::Api { status: 401, .. })) {
            self.auth.invalidate_jwt().await;
        }

        result
    }

    /// Check if the data service answers
    pub async fn health_check(&self) -> bool {
        let url = match self.endpoint.base() {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Neon Data API health check skipped");
                return false;
            }
        };

        match self.http.get(url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                tracing::debug!(status = %resp.status(), "Neon Data API health check passed");
                true
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "Neon Data API health check failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Neon Data API health check failed");
                false
            }
        }
    }
}
