//! Authorization gate middleware and principal extractors.
//!
//! The gate runs in front of every route. It never rejects a request by
//! itself: it verifies the bearer session token when one is present and
//! attaches a [`Principal`] (or the rejection reason) to the request
//! extensions. Handlers opt in to enforcement by extracting [`Principal`],
//! which turns an unauthenticated request into a 401.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware::from_fn_with_state, routing::get};
//! use authbridge_auth::middleware::{GateState, Principal, authorization_gate};
//!
//! async fn me(principal: Principal) -> String {
//!     format!("Hello, {}!", principal.username())
//! }
//!
//! let app = Router::new()
//!     .route("/api/v1/user/me", get(me))
//!     .layer(from_fn_with_state(gate_state, authorization_gate));
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::types::{CredentialRejection, OptionalPrincipal, Principal};
use crate::config::GateConfig;
use crate::error::{AuthError, CredentialErrorKind};
use crate::session::{SessionError, SessionService};

// =============================================================================
// Bypass List
// =============================================================================

/// Paths the gate skips without looking at credentials.
#[derive(Debug, Clone)]
pub struct BypassList {
    paths: Vec<String>,
    prefixes: Vec<String>,
}

impl BypassList {
    /// Builds the list from gate configuration.
    #[must_use]
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            paths: config.public_paths.clone(),
            prefixes: config.public_prefixes.clone(),
        }
    }

    /// Returns `true` if the path is public.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
            || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

// =============================================================================
// Gate State
// =============================================================================

/// State required by the authorization gate.
#[derive(Clone)]
pub struct GateState {
    sessions: Arc<SessionService>,
    bypass: Arc<BypassList>,
}

impl GateState {
    /// Creates a new gate state.
    #[must_use]
    pub fn new(sessions: Arc<SessionService>, config: &GateConfig) -> Self {
        Self {
            sessions,
            bypass: Arc::new(BypassList::from_config(config)),
        }
    }

    /// Returns the bypass list.
    #[must_use]
    pub fn bypass(&self) -> &BypassList {
        &self.bypass
    }
}

// =============================================================================
// Authorization Gate
// =============================================================================

/// Axum middleware that annotates requests with their caller.
///
/// Public paths pass through untouched. For everything else the bearer
/// token, when present and valid, becomes a [`Principal`] in the request
/// extensions; an invalid token leaves the rejection reason instead.
/// Enforcement is the extractor's job, so an endpoint that never extracts
/// `Principal` stays reachable without credentials.
pub async fn authorization_gate(
    State(state): State<GateState>,
    mut request: Request,
    next: Next,
) -> Response {
    if state.bypass.is_public(request.uri().path()) {
        return next.run(request).await;
    }

    if let Some(token) = bearer_token(&request) {
        match state.sessions.verify(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(Principal::new(claims));
            }
            Err(e) => {
                tracing::debug!(
                    path = %request.uri().path(),
                    error = %e,
                    "Session token rejected"
                );
                request
                    .extensions_mut()
                    .insert(CredentialRejection(rejection_kind(&e)));
            }
        }
    }

    next.run(request).await
}

/// Extracts the bearer token from the `Authorization` header.
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

fn rejection_kind(err: &SessionError) -> CredentialErrorKind {
    match err {
        SessionError::Expired => CredentialErrorKind::Expired,
        SessionError::InvalidSignature => CredentialErrorKind::InvalidSignature,
        _ => CredentialErrorKind::Malformed,
    }
}

// =============================================================================
// Extractors
// =============================================================================

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let kind = parts
            .extensions
            .get::<CredentialRejection>()
            .map_or(CredentialErrorKind::Missing, |rejection| rejection.0);
        Err(AuthError::invalid_credential(kind))
    }
}

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}

// =============================================================================
// Tests
// =============================================================================
