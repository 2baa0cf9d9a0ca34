//! Request authentication middleware.
//!
//! This module provides the authorization gate that runs on every request:
//!
//! - [`authorization_gate`] - axum middleware that verifies a bearer session
//!   token and attaches a [`Principal`] to the request
//! - [`Principal`] / [`OptionalPrincipal`] - extractors handlers use to
//!   require or inspect the authenticated caller
//! - [`BypassList`] - public paths the gate skips entirely
//!
//! Error responses, including the `WWW-Authenticate` challenge on 401, live
//! in [`error`].

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{BypassList, GateState, authorization_gate};
pub use types::{OptionalPrincipal, Principal};
