//! Outbound OAuth calls against provider endpoints.
//!
//! [`ProviderClient`] performs the two network steps of a login attempt:
//! exchanging an authorization code for an access token and fetching the raw
//! profile document. It knows nothing about profile shapes; whatever JSON the
//! provider returns is handed to the normalizer untouched.
//!
//! Authorization codes are single-use, so nothing here retries. Every request
//! carries the configured timeout; a provider that stops answering fails the
//! login attempt instead of hanging it.

use std::time::Duration;

use serde::Deserialize;

use super::provider::ProviderConfig;
use crate::error::AuthError;

/// Configuration for the provider HTTP client.
#[derive(Debug, Clone)]
pub struct ProviderClientConfig {
    /// Timeout applied to every outbound request (default: 5 seconds).
    pub request_timeout: Duration,
}

impl Default for ProviderClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ProviderClientConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Successful token-endpoint response.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    /// The provider access token.
    pub access_token: String,

    /// The token type (usually "bearer").
    pub token_type: Option<String>,

    /// Token lifetime in seconds, if the provider reports one.
    pub expires_in: Option<u64>,

    /// Granted scopes.
    pub scope: Option<String>,
}

/// Raw token-endpoint body before the success/error split.
///
/// Providers answer the same endpoint with either an access token or an
/// OAuth error object; some even report errors with a 2xx status.
#[derive(Debug, Deserialize)]
struct TokenExchangeBody {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// HTTP client for provider token and profile endpoints.
pub struct ProviderClient {
    http: reqwest::Client,
}

impl ProviderClient {
    /// Creates a new client with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// practice).
    #[must_use]
    pub fn new(config: ProviderClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { http }
    }

    /// Creates a new client with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ProviderClientConfig::default())
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Sends a form-encoded POST to the provider's token endpoint with
    /// `grant_type=authorization_code`. The client secret is included only
    /// when the provider requires one; the callback `state` is forwarded
    /// only when the provider expects it.
    ///
    /// # Errors
    ///
    /// - `AuthError::Network` on connection or timeout failures
    /// - `AuthError::Upstream` on a non-2xx response
    /// - `AuthError::OAuthRejected` when the body carries an `error` field
    /// - `AuthError::MalformedResponse` when the body is not JSON or lacks
    ///   `access_token`
    pub async fn exchange_code(
        &self,
        provider: &ProviderConfig,
        code: &str,
        state: Option<&str>,
    ) -> Result<TokenResponse, AuthError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("client_id", &provider.client_id),
            ("redirect_uri", provider.redirect_uri.as_str()),
            ("code", code),
        ];

        if provider.requires_client_secret
            && let Some(secret) = &provider.client_secret
        {
            params.push(("client_secret", secret));
        }

        if provider.send_state
            && let Some(state) = state
        {
            params.push(("state", state));
        }

        for (key, value) in &provider.extra_token_params {
            params.push((key, value));
        }

        tracing::debug!(
            provider = %provider.name,
            endpoint = %provider.token_endpoint,
            "Exchanging authorization code"
        );

        let response = self
            .http
            .post(provider.token_endpoint.as_str())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::warn!(
                provider = %provider.name,
                status = status.as_u16(),
                "Token exchange failed"
            );
            tracing::debug!(provider = %provider.name, body = %body, "Token endpoint error body");
            return Err(AuthError::upstream(&provider.name, status.as_u16(), body));
        }

        let parsed: TokenExchangeBody = serde_json::from_str(&body).map_err(|e| {
            AuthError::malformed(
                &provider.name,
                format!("token response is not valid JSON: {e}"),
            )
        })?;

        if let Some(error) = parsed.error {
            return Err(AuthError::oauth_rejected(
                &provider.name,
                error,
                parsed.error_description.unwrap_or_default(),
            ));
        }

        let access_token = parsed.access_token.ok_or_else(|| {
            AuthError::malformed(&provider.name, "token response missing access_token")
        })?;

        Ok(TokenResponse {
            access_token,
            token_type: parsed.token_type,
            expires_in: parsed.expires_in,
            scope: parsed.scope,
        })
    }

    /// Fetches the raw profile document with a bearer token.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::exchange_code`]; a non-JSON body is
    /// `AuthError::MalformedResponse`.
    pub async fn fetch_profile(
        &self,
        provider: &ProviderConfig,
        access_token: &str,
    ) -> Result<serde_json::Value, AuthError> {
        tracing::debug!(
            provider = %provider.name,
            endpoint = %provider.profile_endpoint,
            "Fetching user profile"
        );

        let response = self
            .http
            .get(provider.profile_endpoint.as_str())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = %provider.name,
                status = status.as_u16(),
                "Profile fetch failed"
            );
            tracing::debug!(provider = %provider.name, body = %body, "Profile endpoint error body");
            return Err(AuthError::upstream(&provider.name, status.as_u16(), body));
        }

        response.json().await.map_err(|e| {
            AuthError::malformed(
                &provider.name,
                format!("profile response is not valid JSON: {e}"),
            )
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
