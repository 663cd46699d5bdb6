// Bearer token cache for the provider's OAuth client-credentials flow

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::ProviderConfig;
use crate::error::ApiError;

// Source of bearer tokens for outbound provider calls
#[async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    async fn token(&self) -> Result<String, ApiError>;
}

// Fixed token, for tests and local stubs
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct Authenticator {
    http: reqwest::Client,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_margin: Duration,
    // Held across the refresh request so concurrent callers share one fetch
    cached: Mutex<Option<CachedToken>>,
}

impl Authenticator {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            http,
            token_url: format!("{}/v1/security/oauth2/token", config.api_base()),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_margin: Duration::from_secs(config.token_refresh_margin_secs),
            cached: Mutex::new(None),
        }
    }

    pub async fn get_token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() + self.refresh_margin < token.expires_at {
                return Ok(token.value.clone());
            }
            tracing::debug!("Provider token expired or about to expire, refreshing");
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, ApiError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret)
        else {
            return Err(ApiError::MissingCredentials(
                "client_id and client_secret must be configured".to_string(),
            ));
        };

        let form = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let requested_at = Instant::now();
        let response = self.http.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Failed to fetch provider token");
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("token response: {}", e)))?;

        tracing::info!(expires_in = payload.expires_in, "Fetched provider access token");

        Ok(CachedToken {
            value: payload.access_token,
            expires_at: requested_at + Duration::from_secs(payload.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for Authenticator {
    async fn token(&self) -> Result<String, ApiError> {
        self.get_token().await
    }
}
