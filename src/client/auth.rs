//! Neon Auth client
//!
//! Neon Auth exposes the Better Auth REST routes below the configured auth
//! URL. Sign-in state is kept per client handle and shared by all clones.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;

use super::endpoint::Endpoint;
use super::read_json;
use crate::error::{NeonClientError, Result, Service};

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Server-side session record
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Response of `GET /get-session`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionInfo {
    pub session: Session,
    pub user: User,
}

/// Response of the sign-in and sign-up routes
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user: User,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Clone)]
struct StoredSession {
    token: String,
    user: User,
    jwt: Option<String>,
}

/// Client for the auth service
pub struct AuthClient {
    http: Client,
    endpoint: Endpoint,
    session: RwLock<Option<StoredSession>>,
}

impl AuthClient {
    pub(crate) fn new(http: Client, endpoint: Endpoint) -> Self {
        Self {
            http,
            endpoint,
            session: RwLock::new(None),
        }
    }

    /// The configured auth URL, possibly empty
    pub fn url(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Create an account with email and password, then keep its session
    pub async fn sign_up_email(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignInResponse> {
        let url = self.endpoint.url("sign-up/email")?;
        tracing::debug!(url = %url, "Calling Neon Auth sign-up");

        let response = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;

        let signed_in: SignInResponse = read_json(Service::Auth, response).await?;
        self.store(&signed_in).await;
        Ok(signed_in)
    }

    /// Sign in with email and password, then keep the session
    pub async fn sign_in_email(&self, email: &str, password: &str) -> Result<SignInResponse> {
        let url = self.endpoint.url("sign-in/email")?;
        tracing::debug!(url = %url, "Calling Neon Auth sign-in");

        let response = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let signed_in: SignInResponse = read_json(Service::Auth, response).await?;
        self.store(&signed_in).await;
        Ok(signed_in)
    }

    /// Fetch the current session from the server
    ///
    /// Returns `None` when signed out or when the server no longer knows the
    /// session, in which case the local copy is dropped.
    pub async fn get_session(&self) -> Result<Option<SessionInfo>> {
        let url = self.endpoint.url("get-session")?;
        let Some(token) = self.session_token().await else {
            return Ok(None);
        };

        tracing::debug!(url = %url, "Calling Neon Auth get-session");

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let info: Option<SessionInfo> = read_json(Service::Auth, response).await?;

        let mut guard = self.session.write().await;
        match &info {
            Some(info) => {
                *guard = Some(StoredSession {
                    token: info.session.token.clone(),
                    user: info.user.clone(),
                    jwt: None,
                });
            }
            None => *guard = None,
        }

        Ok(info)
    }

    /// Sign out
    ///
    /// The local session is cleared whatever the server answers.
    pub async fn sign_out(&self) -> Result<()> {
        let url = self.endpoint.url("sign-out")?;
        let Some(stored) = self.session.write().await.take() else {
            return Ok(());
        };

        tracing::debug!(url = %url, "Calling Neon Auth sign-out");

        let response = self
            .http
            .post(url)
            .bearer_auth(&stored.token)
            .json(&json!({}))
            .send()
            .await?;

        let _: serde_json::Value = read_json(Service::Auth, response).await?;
        Ok(())
    }

    /// JWT for Data API calls, or `None` when signed out
    pub async fn access_token(&self) -> Result<Option<String>> {
        let (token, cached) = match self.session.read().await.as_ref() {
            Some(stored) => (stored.token.clone(), stored.jwt.clone()),
            None => return Ok(None),
        };
        if cached.is_some() {
            return Ok(cached);
        }

        let url = self.endpoint.url("token")?;
        tracing::debug!(url = %url, "Fetching Neon Auth JWT");

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let jwt = read_json::<TokenResponse>(Service::Auth, response).await?.token;

        if let Some(stored) = self.session.write().await.as_mut() {
            if stored.token == token {
                stored.jwt = Some(jwt.clone());
            }
        }

        Ok(Some(jwt))
    }

    /// Drop the cached JWT so the next call fetches a fresh one
    pub(crate) async fn invalidate_jwt(&self) {
        if let Some(stored) = self.session.write().await.as_mut() {
            if stored.jwt.take().is_some() {
                tracing::debug!("Dropped cached Neon Auth JWT");
            }
        }
    }

    /// The signed-in user, from local state only
    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Require a signed-in user
    pub async fn require_user(&self) -> Result<User> {
        self.current_user()
            .await
            .ok_or(NeonClientError::NotAuthenticated)
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Check if the auth service answers
    pub async fn health_check(&self) -> bool {
        let url = match self.endpoint.url("ok") {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Neon Auth health check skipped");
                return false;
            }
        };

        match self.http.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("Neon Auth health check passed");
                true
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "Neon Auth health check failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Neon Auth health check failed");
                false
            }
        }
    }

    async fn session_token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    async fn store(&self, signed_in: &SignInResponse) {
        let mut guard = self.session.write().await;
        *guard = signed_in.token.as_ref().map(|token| StoredSession {
            token: token.clone(),
            user: signed_in.user.clone(),
            jwt: None,
        });
    }
}
