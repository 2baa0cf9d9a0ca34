//! Current-user endpoint.
//!
//! `GET /api/v1/user/me` returns the stored profile of the authenticated
//! user. The record is looked up fresh on every call, so a user deleted
//! after the token was issued gets a 404 rather than a stale view.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::middleware::Principal;

use super::{AuthApiState, UserView, envelope};

/// Current-user handler.
pub async fn me_handler(State(state): State<AuthApiState>, principal: Principal) -> Response {
    match state.storage.find_by_id(principal.user_id()).await {
        Ok(Some(user)) => envelope(StatusCode::OK, "user profile", json!(UserView::from(user))),
        Ok(None) => {
            tracing::debug!(user_id = %principal.user_id(), "Session references unknown user");
            envelope(StatusCode::NOT_FOUND, "user not found", Value::Null)
        }
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::config::GateConfig;
    use crate::http::{AuthApiState, auth_router};
    use crate::middleware::{GateState, authorization_gate};
    use crate::session::SessionService;
    use crate::storage::{MemoryUserStorage, User, UserStorage};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::middleware::from_fn_with_state;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    const SECRET: &[u8] = b"test-secret-with-enough-length";

    struct TestApp {
        router: Router,
        storage: Arc<MemoryUserStorage>,
        sessions: Arc<SessionService>,
    }

    fn stub_orchestrator(
        storage: Arc<MemoryUserStorage>,
        sessions: Arc<SessionService>,
    ) -> Arc<crate::federation::LoginOrchestrator> {
        use crate::federation::provider::ProviderRegistry;
        use crate::federation::{LoginOrchestrator, ProviderClient};
        use crate::identity::IdentityResolver;

        Arc::new(LoginOrchestrator::new(
            Arc::new(ProviderRegistry::from_providers(Vec::new())),
            Arc::new(ProviderClient::with_defaults()),
            Arc::new(IdentityResolver::new(storage)),
            sessions,
        ))
    }

    fn test_app() -> TestApp {
        let storage = Arc::new(MemoryUserStorage::new());
        let sessions = Arc::new(SessionService::from_secret(
            SECRET,
            Duration::from_secs(3600),
        ));
        let state = AuthApiState::new(
            stub_orchestrator(storage.clone(), sessions.clone()),
            storage.clone(),
        );
        let gate = GateState::new(sessions.clone(), &GateConfig::default());
        let router = auth_router(state).layer(from_fn_with_state(gate, authorization_gate));
        TestApp {
            router,
            storage,
            sessions,
        }
    }

    fn me_request(token: Option<&str>) -> Request<Body> {
        let builder = Request::builder().uri("/api/v1/user/me");
        let builder = match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_me_returns_stored_profile() {
        let app = test_app();
        let user = User::new("kakao", "555", "Gildong", "a@b.com");
        app.storage.create(&user).await.unwrap();
        let token = app.sessions.issue(&user).unwrap();

        let response = app.router.oneshot(me_request(Some(&token))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "user profile");
        assert_eq!(body["data"]["id"], user.id.to_string());
        assert_eq!(body["data"]["username"], "Gildong");
        assert_eq!(body["data"]["externalId"], "555");
        assert_eq!(body["data"]["isActive"], true);
    }

    #[tokio::test]
    async fn test_me_for_vanished_user_is_not_found() {
        let app = test_app();
        // Issue a valid token but never store the user.
        let user = User::new("kakao", "999", "Ghost", "ghost@example.com");
        let token = app.sessions.issue(&user).unwrap();

        let response = app.router.oneshot(me_request(Some(&token))).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert_eq!(body["message"], "user not found");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_me_without_token_is_unauthorized() {
        let app = test_app();
        let response = app.router.oneshot(me_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
