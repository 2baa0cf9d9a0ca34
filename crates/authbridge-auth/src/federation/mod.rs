//! Identity provider federation.
//!
//! This module provides the outbound half of the login flow:
//!
//! - Provider configuration and the immutable [`ProviderRegistry`]
//! - Authorization-code exchange and profile fetching ([`ProviderClient`])
//! - Normalization of provider-specific profile payloads
//! - The [`LoginOrchestrator`] sequencing one login attempt end to end

pub mod client;
pub mod normalize;
pub mod orchestrator;
pub mod provider;

pub use client::{ProviderClient, ProviderClientConfig, TokenResponse};
pub use normalize::{NormalizedIdentity, normalize};
pub use orchestrator::{LoginOrchestrator, LoginOutcome};
pub use provider::{ProfileShape, ProviderConfig, ProviderRegistry};
