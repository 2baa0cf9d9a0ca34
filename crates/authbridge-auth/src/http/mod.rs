//! HTTP handlers for the federated login flow.
//!
//! This module provides the Axum handlers and router for the auth API:
//!
//! - `POST /api/v1/auth/callback` - complete a login with a JSON body
//! - `GET /auth/{provider}/callback` - provider redirect target
//! - `GET /api/v1/auth/login/{provider}` - redirect to the provider
//! - `GET /api/v1/user/me` - the authenticated caller's profile
//!
//! All endpoints answer with the `{status, message, data}` envelope; error
//! responses use the same shape with `data: null` (see
//! [`crate::middleware::error`]).

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::federation::LoginOrchestrator;
use crate::storage::{User, UserStorage};

pub mod callback;
pub mod login;
pub mod me;

pub use callback::{CallbackQuery, LoginRequest};

// =============================================================================
// State
// =============================================================================

/// State shared by the auth API handlers.
#[derive(Clone)]
pub struct AuthApiState {
    /// The login orchestrator.
    pub orchestrator: Arc<LoginOrchestrator>,

    /// User storage, used by the profile endpoint.
    pub storage: Arc<dyn UserStorage>,
}

impl AuthApiState {
    /// Creates a new auth API state.
    #[must_use]
    pub fn new(orchestrator: Arc<LoginOrchestrator>, storage: Arc<dyn UserStorage>) -> Self {
        Self {
            orchestrator,
            storage,
        }
    }
}

// =============================================================================
// User View
// =============================================================================

/// The user representation returned by the auth API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Local user identifier.
    pub id: Uuid,

    /// Display name.
    pub username: String,

    /// Email address.
    pub email: String,

    /// Provider that authenticated the user.
    pub provider: String,

    /// Account identifier at the provider.
    pub external_id: String,

    /// Whether the account is active.
    pub is_active: bool,

    /// Optional owning organization reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_ref: Option<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            provider: user.provider,
            external_id: user.external_id,
            is_active: user.is_active,
            organization_ref: user.organization_ref,
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the auth API router.
///
/// The returned router carries its own state; merge it into the application
/// router and put the authorization gate in front of the merged result.
pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/api/v1/auth/callback", post(callback::callback_handler))
        .route(
            "/auth/{provider}/callback",
            get(callback::redirect_callback_handler),
        )
        .route(
            "/api/v1/auth/login/{provider}",
            get(login::login_start_handler),
        )
        .route("/api/v1/user/me", get(me::me_handler))
        .with_state(state)
}

/// Builds an enveloped response.
pub(crate) fn envelope(status: StatusCode, message: &str, data: serde_json::Value) -> Response {
    (
        status,
        Json(json!({
            "status": status.as_u16(),
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

// =============================================================================
// Tests
// =============================================================================
