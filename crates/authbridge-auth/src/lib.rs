//! # authbridge-auth
//!
//! Federated login for the AuthBridge server.
//!
//! This crate provides:
//! - Provider registry for third-party identity providers (google, kakao, naver)
//! - Authorization-code exchange and profile fetching against provider endpoints
//! - Normalization of heterogeneous provider profiles into one identity record
//! - Race-safe find-or-create of local users keyed by `(provider, external_id)`
//! - Issuing and verifying self-contained HS256 session tokens
//! - An authorization gate that attaches a [`middleware::Principal`] to requests
//!
//! ## Overview
//!
//! A login attempt enters through the OAuth callback, is orchestrated through
//! token exchange, profile fetch, normalization, identity resolution and
//! session issuance, and leaves as `{token, user}`. Every other request is
//! annotated (never rejected) by the authorization gate; endpoints that need
//! a caller extract [`middleware::Principal`] and answer 401 when it is absent.
//!
//! ## Modules
//!
//! - [`config`] - Session, federation and gate configuration
//! - [`error`] - The error taxonomy shared by all components
//! - [`federation`] - Provider registry, outbound OAuth calls, normalization, orchestration
//! - [`identity`] - Find-or-create resolution of normalized identities
//! - [`session`] - Session token issuing and verification
//! - [`storage`] - User record and storage trait, plus the in-memory store
//! - [`middleware`] - Authorization gate and principal extraction
//! - [`http`] - Axum handlers for the login endpoints

pub mod config;
pub mod error;
pub mod federation;
pub mod http;
pub mod identity;
pub mod middleware;
pub mod session;
pub mod storage;

pub use config::{AuthConfig, FederationConfig, GateConfig, ProviderSettings, SessionConfig};
pub use error::{AuthError, CredentialErrorKind};
pub use federation::{
    LoginOrchestrator, LoginOutcome, NormalizedIdentity, ProfileShape, ProviderClient,
    ProviderClientConfig, ProviderConfig, ProviderRegistry,
};
pub use http::{AuthApiState, CallbackQuery, LoginRequest, UserView, auth_router};
pub use identity::IdentityResolver;
pub use middleware::{GateState, OptionalPrincipal, Principal, authorization_gate};
pub use session::{SessionClaims, SessionError, SessionService};
pub use storage::{MemoryUserStorage, User, UserBuilder, UserStorage};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use authbridge_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, FederationConfig, GateConfig, SessionConfig};
    pub use crate::error::{AuthError, CredentialErrorKind};
    pub use crate::federation::{
        LoginOrchestrator, LoginOutcome, NormalizedIdentity, ProfileShape, ProviderClient,
        ProviderConfig, ProviderRegistry,
    };
    pub use crate::http::{AuthApiState, UserView, auth_router};
    pub use crate::identity::IdentityResolver;
    pub use crate::middleware::{GateState, OptionalPrincipal, Principal, authorization_gate};
    pub use crate::session::{SessionClaims, SessionError, SessionService};
    pub use crate::storage::{MemoryUserStorage, User, UserStorage};
}
