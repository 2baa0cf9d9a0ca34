//! Authentication configuration.
//!
//! Configuration types for the session issuer, the provider federation and
//! the authorization gate. All sections deserialize with defaults so a
//! minimal config file (or none at all) still produces a bootable server;
//! [`AuthConfig::validate`] catches the combinations that cannot work.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth.session]
//! secret = "change-me"
//! ttl = "12h"
//!
//! [auth.federation]
//! request_timeout = "5s"
//!
//! [auth.federation.providers.kakao]
//! client_id = "kakao-rest-key"
//! redirect_uri = "http://localhost:3000/kakao-success"
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::federation::ProfileShape;

/// Root configuration for the auth module.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session token configuration.
    pub session: SessionConfig,

    /// Identity provider federation configuration.
    pub federation: FederationConfig,

    /// Authorization gate configuration.
    pub gate: GateConfig,
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.session.secret.is_empty() {
            return Err("auth.session.secret must not be empty".to_string());
        }
        if self.session.ttl.is_zero() {
            return Err("auth.session.ttl must be positive".to_string());
        }
        if self.federation.request_timeout.is_zero() {
            return Err("auth.federation.request_timeout must be positive".to_string());
        }
        for (name, settings) in &self.federation.providers {
            if settings.client_id.is_empty() {
                return Err(format!(
                    "auth.federation.providers.{name}.client_id must not be empty"
                ));
            }
            if settings.redirect_uri.is_empty() {
                return Err(format!(
                    "auth.federation.providers.{name}.redirect_uri must not be empty"
                ));
            }
        }
        Ok(())
    }
}

/// Session token configuration.
///
/// The secret signs every issued credential (HS256); the TTL bounds its
/// lifetime. There is no server-side session state, so changing the secret
/// invalidates all outstanding credentials at once.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Symmetric signing secret.
    pub secret: String,

    /// Credential lifetime.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl: Duration::from_secs(12 * 3600), // 12 hours
        }
    }
}

/// Identity provider federation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FederationConfig {
    /// Timeout for outbound token-exchange and profile requests.
    /// An unresponsive provider must not hang a login attempt.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Per-provider settings, keyed by provider name.
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            providers: BTreeMap::new(),
        }
    }
}

/// Settings for one identity provider.
///
/// Endpoints and flow quirks default per well-known provider name (google,
/// kakao, naver), so a first-party provider only needs credentials and a
/// redirect URI. Everything can be overridden for test doubles or atypical
/// deployments.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// OAuth client id issued by the provider.
    pub client_id: String,

    /// OAuth client secret. Optional for providers that do not require one
    /// at token-exchange time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Redirect URI registered with the provider.
    pub redirect_uri: String,

    /// Authorization endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// Token endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// Profile (userinfo) endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_endpoint: Option<String>,

    /// Scopes requested at authorization time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,

    /// Which normalization rule applies to this provider's profile payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ProfileShape>,

    /// Whether the token exchange must include the client secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_client_secret: Option<bool>,

    /// Whether the token exchange forwards the callback `state` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_state: Option<bool>,

    /// Extra form parameters appended to the token request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_token_params: Option<Vec<(String, String)>>,
}

/// Authorization gate configuration.
///
/// Paths listed here bypass credential verification entirely. Everything
/// else is verified when a bearer token is present, but the gate itself
/// never rejects a request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Exact paths exempt from verification.
    pub public_paths: Vec<String>,

    /// Path prefixes exempt from verification.
    pub public_prefixes: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            public_paths: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/favicon.ico".to_string(),
                "/healthz".to_string(),
                "/readyz".to_string(),
            ],
            public_prefixes: vec![
                "/auth/".to_string(),
                "/api/v1/auth/".to_string(),
                "/docs/".to_string(),
                "/api-docs/".to_string(),
                "/static/".to_string(),
            ],
        }
    }
}
