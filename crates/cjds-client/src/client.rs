//! HTTP client for the CJ Dropshipping v2 REST API.
//!
//! Wraps `reqwest` with CJ-specific token handling and typed envelope
//! decoding. Every endpoint checks the `result` flag of the JSON envelope and
//! surfaces vendor rejections as the error kind of the calling operation.
//! Gateway operations live in [`crate::products`], [`crate::logistics`] and
//! [`crate::orders`].

use std::time::Duration;

use cjds_core::AppConfig;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CjError;
use crate::session::{AccessToken, AuthSession};

const DEFAULT_BASE_URL: &str = "https://developers.cjdropshipping.com/";
const DEFAULT_USER_AGENT: &str = "cjds/0.1 (catalog-sync)";

/// Header carrying the API key on token exchange and the access token afterwards.
pub(crate) const TOKEN_HEADER: &str = "CJ-Access-Token";

/// Whether a request may be sent again after the vendor rejected its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Re-authenticate and send once more. Used for lookups.
    Once,
    /// Drop the token but surface the rejection. Used for order creation.
    Never,
}

/// Client for the CJ Dropshipping REST API.
///
/// Owns the HTTP client, the vendor API key and an [`AuthSession`]. Use
/// [`CjClient::new`] for production or [`CjClient::with_base_url`] to point at
/// a mock server in tests.
pub struct CjClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    base_url: Url,
    pub(crate) session: AuthSession,
}

impl CjClient {
    /// Creates a client pointed at the production CJ API.
    ///
    /// # Errors
    ///
    /// Returns [`CjError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, CjError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CjError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`CjError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, CjError> {
        Self::build(api_key, timeout_secs, base_url, DEFAULT_USER_AGENT)
    }

    /// Creates a client from the workspace configuration.
    ///
    /// # Errors
    ///
    /// Same as [`CjClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CjError> {
        Self::build(
            &config.cj_api_key,
            config.request_timeout_secs,
            &config.base_url,
            &config.user_agent,
        )
    }

    fn build(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
        user_agent: &str,
    ) -> Result<Self, CjError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so endpoint paths join under any prefix
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| CjError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(CjError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            session: AuthSession::new(),
        })
    }

    /// Replaces the client's token holder, e.g. to share one session between
    /// clients or to start from a token obtained earlier.
    #[must_use]
    pub fn with_session(mut self, session: AuthSession) -> Self {
        self.session = session;
        self
    }

    /// The session holding this client's access token.
    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Builds the full request URL for an endpoint path, appending `params`
    /// percent-encoded and in the given order. No `?` is added when `params`
    /// is empty.
    pub(crate) fn build_url(&self, path: &str, params: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{}", self.base_url.path(), path));
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends an authenticated GET and returns the parsed JSON body.
    pub(crate) async fn get_json(&self, url: &Url, context: &str) -> Result<Value, CjError> {
        self.authorized(
            |token| {
                self.client
                    .get(url.clone())
                    .header(TOKEN_HEADER, token.as_str())
            },
            context,
            Replay::Once,
        )
        .await
    }

    /// Sends an authenticated JSON POST and returns the parsed JSON body.
    pub(crate) async fn post_json<B>(
        &self,
        url: &Url,
        body: &B,
        context: &str,
        replay: Replay,
    ) -> Result<Value, CjError>
    where
        B: serde::Serialize + ?Sized,
    {
        self.authorized(
            |token| {
                self.client
                    .post(url.clone())
                    .header(TOKEN_HEADER, token.as_str())
                    .json(body)
            },
            context,
            replay,
        )
        .await
    }

    /// Runs a request with the cached token, handling an HTTP 401 per `replay`.
    async fn authorized<F>(
        &self,
        request: F,
        context: &str,
        replay: Replay,
    ) -> Result<Value, CjError>
    where
        F: Fn(&AccessToken) -> RequestBuilder,
    {
        let token = self.access_token().await?;
        match self.send_json(request(&token), context).await {
            Err(CjError::Unauthorized { .. }) if replay == Replay::Once => {
                tracing::warn!(context, "CJ rejected access token, re-authenticating");
                self.session.invalidate(&token).await;
                let token = self.access_token().await?;
                self.send_json(request(&token), context).await
            }
            Err(err @ CjError::Unauthorized { .. }) => {
                tracing::warn!(context, "CJ rejected access token, dropping it");
                self.session.invalidate(&token).await;
                Err(err)
            }
            other => other,
        }
    }

    /// Sends a request and parses the body as JSON.
    ///
    /// A non-2xx response whose body is still a vendor envelope is returned as
    /// JSON so the caller reports the vendor's own message.
    ///
    /// # Errors
    ///
    /// - [`CjError::Unauthorized`] on HTTP 401.
    /// - [`CjError::UnexpectedStatus`] on any other non-2xx status without an envelope.
    /// - [`CjError::Http`] on network failure.
    /// - [`CjError::Deserialize`] if a 2xx body is not valid JSON.
    pub(crate) async fn send_json(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Value, CjError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        tracing::debug!(%url, status = status.as_u16(), context, "CJ response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(CjError::Unauthorized {
                context: context.to_owned(),
            });
        }

        let body = response.text().await?;
        if !status.is_success() {
            return match serde_json::from_str::<Value>(&body) {
                Ok(value) if value.get("result").is_some_and(Value::is_boolean) => Ok(value),
                _ => Err(CjError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                }),
            };
        }

        serde_json::from_str(&body).map_err(|e| CjError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Checks the envelope's `result` flag and maps a rejection into the
    /// operation's error kind, keeping the vendor message verbatim.
    pub(crate) fn check_result(body: &Value, kind: fn(String) -> CjError) -> Result<(), CjError> {
        if body.get("result").and_then(Value::as_bool) == Some(true) {
            return Ok(());
        }
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("unknown error")
            .to_owned();
        tracing::warn!(
            code = body.get("code").and_then(serde_json::Value::as_i64),
            %message,
            "CJ API rejected request"
        );
        Err(kind(message))
    }

    pub(crate) fn decode<T: DeserializeOwned>(body: Value, context: &str) -> Result<T, CjError> {
        serde_json::from_value(body).map_err(|e| CjError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
