//! Login initiation endpoint.
//!
//! `GET /api/v1/auth/login/{provider}` redirects the browser to the
//! provider's authorization page with a fresh state value.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use super::AuthApiState;

/// Login initiation handler.
pub async fn login_start_handler(
    State(state): State<AuthApiState>,
    Path(provider): Path<String>,
) -> Response {
    match state.orchestrator.start_login(&provider) {
        Ok(url) => Redirect::temporary(url.as_str()).into_response(),
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Tests
// =============================================================================
