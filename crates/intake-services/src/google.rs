//! Google service-account authentication.
//!
//! Both REST clients (Drive, Sheets) authenticate with a bearer token
//! obtained by exchanging an RS256-signed JWT assertion at Google's OAuth
//! token endpoint. The token is cached and refreshed shortly before expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use intake_core::Config;

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/spreadsheets";
const TOKEN_LIFETIME_SECS: u64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Shared token source, injected into both REST clients as `Arc<GoogleAuth>`.
pub struct GoogleAuth {
    http_client: reqwest::Client,
    client_email: String,
    encoding_key: EncodingKey,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        let encoding_key = EncodingKey::from_rsa_pem(config.google_private_key.as_bytes())
            .context("GOOGLE_PRIVATE_KEY is not a valid RSA PEM key")?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client for Google auth")?;

        Ok(Arc::new(Self {
            http_client,
            client_email: config.google_client_email.clone(),
            encoding_key,
            token_uri: TOKEN_URI.to_string(),
            cached: Mutex::new(None),
        }))
    }

    /// Return a valid bearer token, exchanging a fresh assertion if the
    /// cached one is absent or close to expiry.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange().await?;
        let value = fresh.access_token.clone();
        let lifetime = fresh
            .expires_in
            .saturating_sub(EXPIRY_MARGIN_SECS)
            .max(EXPIRY_MARGIN_SECS);
        *cached = Some(CachedToken {
            value: fresh.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        tracing::debug!(expires_in = lifetime, "Refreshed Google access token");
        Ok(value)
    }

    async fn exchange(&self) -> Result<TokenResponse> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPES,
            aud: &self.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS as i64,
        };

        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )
        .context("Failed to sign service-account assertion")?;

        let response = self
            .http_client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("Failed to reach Google token endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Token exchange failed: {} - {}",
                status,
                body
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse token response")
    }
}
