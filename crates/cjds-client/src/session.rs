//! Access-token handling for the CJ client.
//!
//! The vendor exchanges the long-lived API key for a bearer access token.
//! [`AuthSession`] holds that token for every gateway call. The session lock is
//! held across the token exchange, so concurrent cold-start callers share one
//! network round trip instead of each authenticating.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::{CjClient, TOKEN_HEADER};
use crate::error::CjError;
use crate::types::{AccessTokenData, ApiResponse};

pub(crate) const AUTH_PATH: &str = "api2.0/v1/authentication/getAccessToken";

/// An opaque vendor-issued bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Shared holder for the current access token.
///
/// Cloning is cheap and yields a handle to the same token slot, so several
/// clients may share one session.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl AuthSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session seeded with a token obtained elsewhere.
    #[must_use]
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token))),
        }
    }

    /// Returns the cached token without contacting the vendor.
    pub async fn current(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }

    /// Discards the cached token; the next gateway call authenticates again.
    pub async fn clear(&self) {
        self.token.lock().await.take();
    }

    /// Returns the cached token, or runs `exchange` to obtain one.
    ///
    /// The slot stays locked while `exchange` runs, so callers arriving in the
    /// meantime wait for its outcome rather than starting their own.
    pub(crate) async fn get_or_authenticate<F, Fut>(
        &self,
        exchange: F,
    ) -> Result<AccessToken, CjError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<AccessToken, CjError>>,
    {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }
        let token = exchange().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Unconditionally replaces the cached token with the outcome of `exchange`.
    ///
    /// A failed exchange leaves the previous token in place.
    pub(crate) async fn refresh<F, Fut>(&self, exchange: F) -> Result<AccessToken, CjError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<AccessToken, CjError>>,
    {
        let mut slot = self.token.lock().await;
        let token = exchange().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Drops `stale` if it is still the cached token.
    ///
    /// Returns `false` when another caller already replaced it.
    pub(crate) async fn invalidate(&self, stale: &AccessToken) -> bool {
        let mut slot = self.token.lock().await;
        if slot.as_ref() == Some(stale) {
            *slot = None;
            true
        } else {
            false
        }
    }
}

impl CjClient {
    /// Exchanges the API key for a fresh access token and caches it.
    ///
    /// Always contacts the vendor, replacing any cached token on success.
    ///
    /// # Errors
    ///
    /// - [`CjError::Authentication`] if the vendor reports `result: false` or
    ///   the response carries no token.
    /// - [`CjError::Http`] on network failure.
    /// - [`CjError::Deserialize`] if the response is not a vendor envelope.
    pub async fn authenticate(&self) -> Result<AccessToken, CjError> {
        self.session
            .refresh(|| self.exchange_api_key())
            .await
    }

    /// Discards the cached access token.
    pub async fn clear_token(&self) {
        self.session.clear().await;
    }

    /// Returns the cached token, authenticating first when there is none.
    pub(crate) async fn access_token(&self) -> Result<AccessToken, CjError> {
        self.session
            .get_or_authenticate(|| self.exchange_api_key())
            .await
    }

    async fn exchange_api_key(&self) -> Result<AccessToken, CjError> {
        let url = self.build_url(AUTH_PATH, &[]);
        tracing::debug!(%url, "requesting CJ access token");

        let request = self
            .client
            .post(url.clone())
            .header(TOKEN_HEADER, &self.api_key)
            .json(&serde_json::json!({}));
        let body = match self.send_json(request, "authentication/getAccessToken").await {
            Err(CjError::Unauthorized { .. }) => {
                return Err(CjError::Authentication(
                    "API key rejected (HTTP 401)".to_owned(),
                ))
            }
            other => other?,
        };
        Self::check_result(&body, CjError::Authentication)?;

        let envelope: ApiResponse<AccessTokenData> =
            Self::decode(body, "authentication/getAccessToken")?;
        let token = envelope
            .data
            .and_then(|d| d.access_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CjError::Authentication("response did not include an access token".to_owned())
            })?;

        tracing::info!("obtained CJ access token");
        Ok(AccessToken::new(token))
    }
}
