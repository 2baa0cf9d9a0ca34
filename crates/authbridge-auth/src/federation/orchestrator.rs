//! Federated login orchestration.
//!
//! [`LoginOrchestrator`] owns the whole login sequence: resolve the provider,
//! exchange the authorization code, fetch and normalize the profile, resolve
//! the local identity, and issue a session token. Each step's error ends the
//! flow; nothing is retried and nothing is rolled back (a user created along
//! the way stays).
//!
//! The orchestrator is deliberately shape-blind. Provider differences live in
//! the registry defaults and the normalizer, so adding a provider does not
//! touch this file.
//!
//! # Example
//!
//! ```ignore
//! use authbridge_auth::federation::LoginOrchestrator;
//!
//! let outcome = orchestrator.login("kakao", "abc123", None).await?;
//! println!("issued session for {}", outcome.user.username);
//! ```

use std::sync::Arc;

use url::Url;
use uuid::Uuid;

use super::client::ProviderClient;
use super::normalize::normalize;
use super::provider::ProviderRegistry;
use crate::AuthResult;
use crate::identity::IdentityResolver;
use crate::session::SessionService;
use crate::storage::User;

/// The result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The issued session token.
    pub token: String,

    /// The resolved local user.
    pub user: User,
}

/// Runs the federated login flow end to end.
pub struct LoginOrchestrator {
    registry: Arc<ProviderRegistry>,
    client: Arc<ProviderClient>,
    resolver: Arc<IdentityResolver>,
    sessions: Arc<SessionService>,
}

impl LoginOrchestrator {
    /// Creates a new orchestrator.
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        client: Arc<ProviderClient>,
        resolver: Arc<IdentityResolver>,
        sessions: Arc<SessionService>,
    ) -> Self {
        Self {
            registry,
            client,
            resolver,
            sessions,
        }
    }

    /// Returns the provider registry.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Completes a login with an authorization code from a provider callback.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error unchanged: provider resolution,
    /// token exchange, profile fetch, normalization, identity resolution,
    /// or session issuance.
    pub async fn login(
        &self,
        provider_name: &str,
        code: &str,
        state: Option<&str>,
    ) -> AuthResult<LoginOutcome> {
        let provider = self.registry.resolve(provider_name)?;

        tracing::info!(provider = %provider.name, "Starting federated login");

        let token = self.client.exchange_code(&provider, code, state).await?;
        let profile = self
            .client
            .fetch_profile(&provider, &token.access_token)
            .await?;
        let identity = normalize(&provider, &profile)?;
        let user = self.resolver.resolve(&identity).await?;
        let session = self.sessions.issue(&user)?;

        tracing::info!(
            provider = %provider.name,
            external_id = %user.external_id,
            user_id = %user.id,
            "Federated login succeeded"
        );

        Ok(LoginOutcome {
            token: session,
            user,
        })
    }

    /// Builds the provider authorization URL that starts a login.
    ///
    /// Each call uses a fresh UUID as the `state` parameter.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderNotSupported` for an unknown provider.
    pub fn start_login(&self, provider_name: &str) -> AuthResult<Url> {
        let provider = self.registry.resolve(provider_name)?;
        let state = Uuid::new_v4().to_string();

        tracing::debug!(provider = %provider.name, "Building authorization redirect");

        Ok(provider.authorize_url(&state))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::federation::client::ProviderClientConfig;
    use crate::federation::provider::{ProfileShape, ProviderConfig};
    use crate::storage::MemoryUserStorage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &[u8] = b"test-secret-with-enough-length";

    fn provider_for(shape: ProfileShape, base: &str) -> ProviderConfig {
        let name = match shape {
            ProfileShape::Google => "google",
            ProfileShape::Kakao => "kakao",
            ProfileShape::Naver => "naver",
        };
        ProviderConfig::new(
            name,
            shape,
            "client-123",
            Url::parse("http://localhost:3000/success").unwrap(),
        )
        .with_token_endpoint(Url::parse(&format!("{base}/oauth/token")).unwrap())
        .with_profile_endpoint(Url::parse(&format!("{base}/profile")).unwrap())
    }

    fn orchestrator_for(
        shape: ProfileShape,
        base: &str,
    ) -> (LoginOrchestrator, Arc<MemoryUserStorage>, Arc<SessionService>) {
        let storage = Arc::new(MemoryUserStorage::new());
        let sessions = Arc::new(SessionService::from_secret(
            SECRET,
            std::time::Duration::from_secs(3600),
        ));
        let orchestrator = LoginOrchestrator::new(
            Arc::new(ProviderRegistry::from_providers(vec![provider_for(shape, base)])),
            Arc::new(ProviderClient::new(ProviderClientConfig::default())),
            Arc::new(IdentityResolver::new(storage.clone())),
            sessions.clone(),
        );
        (orchestrator, storage, sessions)
    }

    async fn mount_token(server: &MockServer, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": access_token})),
            )
            .mount(server)
            .await;
    }

    async fn mount_profile(server: &MockServer, token: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_kakao_login_end_to_end() {
        let server = MockServer::start().await;
        mount_token(&server, "tok1").await;
        mount_profile(
            &server,
            "tok1",
            serde_json::json!({
                "id": "555",
                "kakao_account": {
                    "email": "a@b.com",
                    "profile": {"nickname": "Gildong"}
                }
            }),
        )
        .await;

        let (orchestrator, storage, sessions) = orchestrator_for(ProfileShape::Kakao, &server.uri());
        let outcome = orchestrator.login("kakao", "abc123", None).await.unwrap();

        assert_eq!(outcome.user.provider, "kakao");
        assert_eq!(outcome.user.external_id, "555");
        assert_eq!(outcome.user.username, "Gildong");
        assert_eq!(outcome.user.email, "a@b.com");
        assert!(outcome.user.is_active);
        assert_eq!(storage.len().await, 1);

        let claims = sessions.verify(&outcome.token).unwrap();
        assert_eq!(claims.external_id, "555");
        assert_eq!(claims.user_id, outcome.user.id);
    }

    #[tokio::test]
    async fn test_repeat_login_reuses_user() {
        let server = MockServer::start().await;
        mount_token(&server, "tok1").await;
        mount_profile(
            &server,
            "tok1",
            serde_json::json!({
                "id": "555",
                "kakao_account": {"email": "a@b.com", "profile": {"nickname": "Gildong"}}
            }),
        )
        .await;

        let (orchestrator, storage, _) = orchestrator_for(ProfileShape::Kakao, &server.uri());

        let first = orchestrator.login("kakao", "abc123", None).await.unwrap();
        let second = orchestrator.login("kakao", "def456", None).await.unwrap();

        assert_eq!(first.user.id, second.user.id);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_google_profile_missing_email_fails_without_user() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-g").await;
        mount_profile(
            &server,
            "tok-g",
            serde_json::json!({"sub": "108177", "name": "Jane Tester"}),
        )
        .await;

        let (orchestrator, storage, _) = orchestrator_for(ProfileShape::Google, &server.uri());
        let err = orchestrator.login("google", "code-1", None).await.unwrap_err();

        assert!(matches!(err, AuthError::MalformedResponse { .. }));
        assert!(err.to_string().contains("failed to retrieve profile"));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_token_exchange_failure_stops_flow() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let (orchestrator, storage, _) = orchestrator_for(ProfileShape::Kakao, &server.uri());
        let err = orchestrator.login("kakao", "abc123", None).await.unwrap_err();

        assert!(matches!(err, AuthError::Upstream { status: 500, .. }));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let server = MockServer::start().await;
        let (orchestrator, _, _) = orchestrator_for(ProfileShape::Kakao, &server.uri());

        let err = orchestrator.login("github", "abc123", None).await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderNotSupported { .. }));
    }

    #[tokio::test]
    async fn test_start_login_builds_authorize_url_with_state() {
        let server = MockServer::start().await;
        let (orchestrator, _, _) = orchestrator_for(ProfileShape::Kakao, &server.uri());

        let url = orchestrator.start_login("kakao").unwrap();

        assert!(url.as_str().starts_with("https://kauth.kakao.com/oauth/authorize"));
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(Uuid::parse_str(&state).is_ok());

        // Each call gets a fresh state.
        let again = orchestrator.start_login("kakao").unwrap();
        assert_ne!(url.as_str(), again.as_str());
    }
}
