// Google OAuth - ID token verification against Google's published keys

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const CERTS_TTL: Duration = Duration::from_secs(3600);

/// Identity claims we care about from a verified ID token
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GoogleIdentity {
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    /// Verify `id_token` was issued by the provider for `client_id`
    async fn verify(&self, id_token: &str, client_id: &str) -> AppResult<GoogleIdentity>;
}

pub struct GoogleTokenVerifier {
    http: reqwest::Client,
    certs_url: String,
    certs: RwLock<Option<(Instant, JwkSet)>>,
}

impl GoogleTokenVerifier {
    pub fn new() -> Self {
        Self::with_certs_url(GOOGLE_CERTS_URL)
    }

    pub fn with_certs_url(certs_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            certs_url: certs_url.into(),
            certs: RwLock::new(None),
        }
    }

    async fn signing_keys(&self) -> AppResult<JwkSet> {
        {
            let cached = self.certs.read().await;
            if let Some((fetched_at, keys)) = cached.as_ref() {
                if fetched_at.elapsed() < CERTS_TTL {
                    return Ok(keys.clone());
                }
            }
        }

        debug!("Fetching Google signing keys from {}", self.certs_url);
        let keys: JwkSet = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::Upstream(format!("Failed to fetch Google certificates: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed Google certificates: {}", e)))?;

        *self.certs.write().await = Some((Instant::now(), keys.clone()));
        Ok(keys)
    }
}

impl Default for GoogleTokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str, client_id: &str) -> AppResult<GoogleIdentity> {
        let invalid = |reason: String| {
            warn!("Google ID token rejected: {}", reason);
            AppError::Upstream("Invalid Google token".to_string())
        };

        let header = decode_header(id_token).map_err(|e| invalid(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| invalid("token header has no key id".to_string()))?;

        let keys = self.signing_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| invalid(format!("unknown signing key {}", kid)))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| invalid(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        decode::<GoogleIdentity>(id_token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| invalid(e.to_string()))
    }
}
