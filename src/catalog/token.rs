//! Client-credentials token exchange and cache.
//!
//! The catalog only accepts requests carrying a bearer token obtained by
//! exchanging the application's client id/secret. Tokens live for an hour;
//! [`TokenCache`] keeps the current one and re-runs the exchange once it is
//! within [`EXPIRY_MARGIN`] of expiring.
//!
//! The cache is an ordinary owned value. Construct one per process (or per
//! test) and hand it to whatever needs tokens.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::dto;
use crate::catalog::domain::{CatalogError, Credential};

/// Tokens are treated as expired this long before the provider says so.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Result of one token exchange.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime reported by the provider
    pub expires_in: Duration,
}

/// Performs a single token exchange against the provider.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self) -> Result<TokenGrant, CatalogError>;
}

/// Source of valid credentials for catalog requests.
#[async_trait]
pub trait AccessTokens: Send + Sync {
    async fn access_token(&self) -> Result<Credential, CatalogError>;

    /// Forget the current credential so the next call fetches a fresh one.
    async fn invalidate(&self);
}

/// Client-credentials exchange over HTTP.
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
    http_client: reqwest::Client,
    token_url: String,
}

impl ClientCredentials {
    /// Create an exchange for the given application credentials.
    ///
    /// Empty values are accepted here and rejected at exchange time, so a
    /// misconfigured server still starts and reports the problem per request.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http_client,
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Point the exchange at a different token endpoint.
    #[cfg(test)]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

#[async_trait]
impl TokenExchange for ClientCredentials {
    async fn exchange(&self) -> Result<TokenGrant, CatalogError> {
        if !self.has_credentials() {
            return Err(CatalogError::MissingCredentials);
        }

        let response = self
            .http_client
            .post(&self.token_url)
            .header(
                reqwest::header::AUTHORIZATION,
                basic_auth_header(&self.client_id, &self.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            let message = match response.json::<dto::AuthError>().await {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            return Err(CatalogError::Auth(format!("HTTP {}: {}", status.as_u16(), message)));
        }

        let token = response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(TokenGrant {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: Duration::from_secs(token.expires_in),
        })
    }
}

/// `Authorization` header value for HTTP Basic auth.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Caches the current credential and refreshes it when it expires.
pub struct TokenCache<E> {
    exchange: E,
    current: Mutex<Option<Credential>>,
}

impl<E: TokenExchange> TokenCache<E> {
    pub fn new(exchange: E) -> Self {
        Self {
            exchange,
            current: Mutex::new(None),
        }
    }

    /// Return a valid credential, exchanging for a new one if needed.
    ///
    /// The lock is held across the exchange so concurrent callers that find
    /// the cache empty wait for one exchange instead of each starting their own.
    pub async fn get_token(&self) -> Result<Credential, CatalogError> {
        let mut current = self.current.lock().await;

        if let Some(credential) = current.as_ref()
            && credential.is_valid_at(Instant::now())
        {
            return Ok(credential.clone());
        }

        tracing::debug!("Exchanging client credentials for a catalog token");
        let grant = self.exchange.exchange().await?;
        let credential = Credential {
            access_token: grant.access_token,
            token_type: grant.token_type,
            expires_at: Instant::now() + grant.expires_in.saturating_sub(EXPIRY_MARGIN),
        };
        tracing::info!(
            "Obtained catalog token (valid for {}s)",
            grant.expires_in.saturating_sub(EXPIRY_MARGIN).as_secs()
        );

        *current = Some(credential.clone());
        Ok(credential)
    }

    /// Drop the cached credential so the next call exchanges again.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

#[async_trait]
impl<E: TokenExchange> AccessTokens for TokenCache<E> {
    async fn access_token(&self) -> Result<Credential, CatalogError> {
        self.get_token().await
    }

    async fn invalidate(&self) {
        TokenCache::invalidate(self).await;
    }
}
