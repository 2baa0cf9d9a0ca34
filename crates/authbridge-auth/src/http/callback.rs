//! Login callback endpoints.
//!
//! Two routes complete a login with an authorization code:
//!
//! - `POST /api/v1/auth/callback` - JSON body, used by frontends that
//!   received the provider redirect themselves
//! - `GET /auth/{provider}/callback` - direct provider redirect target with
//!   `code` and `state` query parameters
//!
//! Both run the same flow and answer `201 Created` with the session token
//! and the resolved user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use super::{AuthApiState, UserView, envelope};

// =============================================================================
// Request Types
// =============================================================================

/// JSON body for the POST callback endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// The authorization code from the provider redirect.
    pub code: String,

    /// The provider name.
    pub provider: String,

    /// The opaque state from the provider redirect, if any.
    #[serde(default)]
    pub state: Option<String>,
}

/// Query parameters of the provider redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// The authorization code.
    pub code: String,

    /// The opaque state, if the provider echoes one.
    #[serde(default)]
    pub state: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// JSON callback endpoint handler.
pub async fn callback_handler(
    State(state): State<AuthApiState>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response {
    complete_login(
        &state,
        &request.provider,
        &request.code,
        request.state.as_deref(),
    )
    .await
}

/// Provider redirect endpoint handler.
pub async fn redirect_callback_handler(
    State(state): State<AuthApiState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    complete_login(&state, &provider, &query.code, query.state.as_deref()).await
}

async fn complete_login(
    state: &AuthApiState,
    provider: &str,
    code: &str,
    login_state: Option<&str>,
) -> Response {
    match state.orchestrator.login(provider, code, login_state).await {
        Ok(outcome) => {
            let user = UserView::from(outcome.user);
            envelope(
                StatusCode::CREATED,
                "login successful",
                json!({"token": outcome.token, "user": user}),
            )
        }
        Err(e) => {
            if e.is_upstream() {
                tracing::warn!(provider = %provider, error = %e, "Federated login failed");
            } else {
                tracing::debug!(provider = %provider, error = %e, "Federated login rejected");
            }
            e.into_response()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
