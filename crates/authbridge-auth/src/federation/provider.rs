//! Identity provider configuration and registry.
//!
//! Each supported provider is described by an immutable [`ProviderConfig`]
//! holding its endpoints, credentials and flow quirks. The configs live in a
//! [`ProviderRegistry`] built once at startup; request handling only ever
//! reads from it.
//!
//! # Example
//!
//! ```ignore
//! use authbridge_auth::federation::{ProfileShape, ProviderConfig, ProviderRegistry};
//! use url::Url;
//!
//! let kakao = ProviderConfig::new(
//!     "kakao",
//!     ProfileShape::Kakao,
//!     "rest-api-key",
//!     Url::parse("http://localhost:3000/kakao-success")?,
//! );
//! let registry = ProviderRegistry::from_providers(vec![kakao]);
//! let provider = registry.resolve("KAKAO")?;
//! assert!(!provider.requires_client_secret);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{FederationConfig, ProviderSettings};
use crate::error::AuthError;

// =============================================================================
// Profile Shape
// =============================================================================

/// Which normalization rule applies to a provider's profile payload.
///
/// The variants are named after the providers whose wire formats they
/// describe; a custom provider that mimics one of these formats can reuse
/// the matching shape via configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileShape {
    /// OpenID Connect userinfo: top-level `sub`, `name`, `email`.
    Google,
    /// Top-level `id` with `email` and `profile.nickname` nested under
    /// `kakao_account`.
    Kakao,
    /// All fields nested one level under a `response` wrapper.
    Naver,
}

impl ProfileShape {
    /// Returns the default shape for a well-known provider name.
    #[must_use]
    pub fn for_provider_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "google" => Some(Self::Google),
            "kakao" => Some(Self::Kakao),
            "naver" => Some(Self::Naver),
            _ => None,
        }
    }

    fn default_authorization_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Self::Kakao => "https://kauth.kakao.com/oauth/authorize",
            Self::Naver => "https://nid.naver.com/oauth2.0/authorize",
        }
    }

    fn default_token_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://oauth2.googleapis.com/token",
            Self::Kakao => "https://kauth.kakao.com/oauth/token",
            Self::Naver => "https://nid.naver.com/oauth2.0/token",
        }
    }

    fn default_profile_endpoint(self) -> &'static str {
        match self {
            Self::Google => "https://www.googleapis.com/oauth2/v3/userinfo",
            Self::Kakao => "https://kapi.kakao.com/v2/user/me",
            Self::Naver => "https://openapi.naver.com/v1/nid/me",
        }
    }

    fn default_scopes(self) -> Vec<String> {
        match self {
            Self::Google => vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            Self::Kakao => vec![
                "profile_nickname".to_string(),
                "account_email".to_string(),
            ],
            Self::Naver => Vec::new(),
        }
    }

    /// Kakao accepts its REST API key without a client secret.
    fn default_requires_client_secret(self) -> bool {
        !matches!(self, Self::Kakao)
    }

    /// Naver expects the callback `state` echoed in the token request.
    fn default_send_state(self) -> bool {
        matches!(self, Self::Naver)
    }

    fn default_extra_token_params(self) -> Vec<(String, String)> {
        match self {
            // Kakao's token endpoint takes the scope list as a form field.
            Self::Kakao => vec![(
                "scope".to_string(),
                "profile_nickname,account_email".to_string(),
            )],
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Provider Config
// =============================================================================

/// Immutable configuration for one identity provider.
///
/// Values come from process configuration at startup and never change at
/// request time.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider name (lowercase), used in lookups, logs and user records.
    pub name: String,

    /// Authorization endpoint users are redirected to.
    pub authorization_endpoint: Url,

    /// Token endpoint for the authorization-code exchange.
    pub token_endpoint: Url,

    /// Userinfo endpoint for profile fetching.
    pub profile_endpoint: Url,

    /// OAuth client id issued by the provider.
    pub client_id: String,

    /// OAuth client secret, if the provider issued one.
    pub client_secret: Option<String>,

    /// Redirect URI registered with the provider.
    pub redirect_uri: Url,

    /// Whether the token exchange must include the client secret.
    pub requires_client_secret: bool,

    /// Scopes requested at authorization time.
    pub scopes: Vec<String>,

    /// Normalization rule for this provider's profile payload.
    pub shape: ProfileShape,

    /// Whether the token exchange forwards the callback `state` value.
    pub send_state: bool,

    /// Extra form parameters appended to the token request.
    pub extra_token_params: Vec<(String, String)>,
}

impl ProviderConfig {
    /// Creates a provider config with the shape's default endpoints, scopes
    /// and flow quirks.
    ///
    /// # Panics
    ///
    /// Panics if a built-in default endpoint fails to parse, which cannot
    /// happen for the shipped constants.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        shape: ProfileShape,
        client_id: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        Self {
            name: name.into().to_lowercase(),
            authorization_endpoint: Url::parse(shape.default_authorization_endpoint())
                .expect("default authorization endpoint is valid"),
            token_endpoint: Url::parse(shape.default_token_endpoint())
                .expect("default token endpoint is valid"),
            profile_endpoint: Url::parse(shape.default_profile_endpoint())
                .expect("default profile endpoint is valid"),
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri,
            requires_client_secret: shape.default_requires_client_secret(),
            scopes: shape.default_scopes(),
            shape,
            send_state: shape.default_send_state(),
            extra_token_params: shape.default_extra_token_params(),
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the authorization endpoint.
    #[must_use]
    pub fn with_authorization_endpoint(mut self, endpoint: Url) -> Self {
        self.authorization_endpoint = endpoint;
        self
    }

    /// Sets the token endpoint.
    #[must_use]
    pub fn with_token_endpoint(mut self, endpoint: Url) -> Self {
        self.token_endpoint = endpoint;
        self
    }

    /// Sets the profile endpoint.
    #[must_use]
    pub fn with_profile_endpoint(mut self, endpoint: Url) -> Self {
        self.profile_endpoint = endpoint;
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets whether the token exchange includes the client secret.
    #[must_use]
    pub fn with_requires_client_secret(mut self, required: bool) -> Self {
        self.requires_client_secret = required;
        self
    }

    /// Sets whether the token exchange forwards the callback state.
    #[must_use]
    pub fn with_send_state(mut self, send: bool) -> Self {
        self.send_state = send;
        self
    }

    /// Sets extra form parameters for the token request.
    #[must_use]
    pub fn with_extra_token_params(mut self, params: Vec<(String, String)>) -> Self {
        self.extra_token_params = params;
        self
    }

    /// Returns `true` if a client secret is configured.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.client_secret.is_some()
    }

    /// Builds the authorization URL a user should be redirected to.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.authorization_endpoint.clone();
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("response_type", "code");
            params.append_pair("client_id", &self.client_id);
            params.append_pair("redirect_uri", self.redirect_uri.as_str());
            if !self.scopes.is_empty() {
                params.append_pair("scope", &self.scopes.join(" "));
            }
            params.append_pair("state", state);
        }
        url
    }

    /// Builds a provider config from configuration settings.
    ///
    /// Unset endpoints, scopes and flags fall back to the shape defaults;
    /// the shape itself falls back to the well-known provider name.
    pub fn from_settings(name: &str, settings: &ProviderSettings) -> Result<Self, AuthError> {
        let shape = settings
            .shape
            .or_else(|| ProfileShape::for_provider_name(name))
            .ok_or_else(|| {
                AuthError::configuration(format!(
                    "provider {name} has no profile shape; set auth.federation.providers.{name}.shape"
                ))
            })?;

        let redirect_uri = parse_endpoint(name, "redirect_uri", &settings.redirect_uri)?;

        let mut provider = Self::new(name, shape, settings.client_id.clone(), redirect_uri);

        if let Some(endpoint) = &settings.authorization_endpoint {
            provider.authorization_endpoint =
                parse_endpoint(name, "authorization_endpoint", endpoint)?;
        }
        if let Some(endpoint) = &settings.token_endpoint {
            provider.token_endpoint = parse_endpoint(name, "token_endpoint", endpoint)?;
        }
        if let Some(endpoint) = &settings.profile_endpoint {
            provider.profile_endpoint = parse_endpoint(name, "profile_endpoint", endpoint)?;
        }
        if let Some(scopes) = &settings.scopes {
            provider.scopes = scopes.clone();
        }
        if let Some(required) = settings.requires_client_secret {
            provider.requires_client_secret = required;
        }
        if let Some(send_state) = settings.send_state {
            provider.send_state = send_state;
        }
        if let Some(params) = &settings.extra_token_params {
            provider.extra_token_params = params.clone();
        }
        provider.client_secret = settings.client_secret.clone();

        if provider.requires_client_secret && provider.client_secret.is_none() {
            return Err(AuthError::configuration(format!(
                "provider {name} requires a client secret but none is configured"
            )));
        }

        Ok(provider)
    }
}

fn parse_endpoint(provider: &str, field: &str, value: &str) -> Result<Url, AuthError> {
    Url::parse(value).map_err(|e| {
        AuthError::configuration(format!("provider {provider}: invalid {field} ({e})"))
    })
}

// =============================================================================
// Provider Registry
// =============================================================================

/// Immutable registry of configured providers.
///
/// Built once at startup; `resolve` is the only operation available at
/// request time.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<ProviderConfig>>,
}

impl ProviderRegistry {
    /// Builds a registry from federation configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` for unusable provider settings.
    pub fn from_config(config: &FederationConfig) -> Result<Self, AuthError> {
        let mut providers = HashMap::new();
        for (name, settings) in &config.providers {
            let provider = ProviderConfig::from_settings(name, settings)?;
            providers.insert(provider.name.clone(), Arc::new(provider));
        }
        Ok(Self { providers })
    }

    /// Builds a registry from already-constructed provider configs.
    #[must_use]
    pub fn from_providers(providers: Vec<ProviderConfig>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|p| (p.name.clone(), Arc::new(p)))
                .collect(),
        }
    }

    /// Resolves a provider by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderNotSupported` for unknown names.
    pub fn resolve(&self, name: &str) -> Result<Arc<ProviderConfig>, AuthError> {
        self.providers
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| AuthError::provider_not_supported(name))
    }

    /// Returns the configured provider names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Returns the number of configured providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if no providers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
