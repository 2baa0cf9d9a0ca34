//! Provider profile normalization.
//!
//! Every provider returns its own profile document: Google follows the OIDC
//! userinfo layout, Kakao nests account data under `kakao_account`, and Naver
//! wraps everything in a `response` envelope. This module flattens all three
//! into a single [`NormalizedIdentity`] so the rest of the crate never
//! inspects raw provider JSON.
//!
//! Google profiles must be complete; a missing field fails the login. Kakao
//! and Naver profiles omit fields depending on user consent, so those shapes
//! fall back to placeholder values instead of failing.

use serde_json::Value;

use super::provider::{ProfileShape, ProviderConfig};
use crate::error::AuthError;

/// Placeholder email for Kakao users who did not consent to email sharing.
const KAKAO_FALLBACK_EMAIL: &str = "unknown@kakao.com";

/// Placeholder nickname for Kakao users without a readable profile.
const KAKAO_FALLBACK_NAME: &str = "Unknown User";

/// Placeholder email for Naver users who did not consent to email sharing.
const NAVER_FALLBACK_EMAIL: &str = "unknown@naver.com";

/// Placeholder name for Naver users without a readable profile.
const NAVER_FALLBACK_NAME: &str = "Unknown";

/// A provider-agnostic identity extracted from a raw profile document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIdentity {
    /// Canonical provider name the profile came from.
    pub provider: String,

    /// Stable per-provider account identifier, always a string.
    pub external_id: String,

    /// Human-readable display name.
    pub display_name: String,

    /// Email address, possibly a placeholder for consent-gated shapes.
    pub email: String,
}

/// Normalizes a raw profile document according to the provider's shape.
///
/// # Errors
///
/// Returns `AuthError::MalformedResponse` when a required field is absent.
/// The set of required fields depends on the shape; only the external
/// identifier is required everywhere.
pub fn normalize(provider: &ProviderConfig, profile: &Value) -> Result<NormalizedIdentity, AuthError> {
    match provider.shape {
        ProfileShape::Google => normalize_google(&provider.name, profile),
        ProfileShape::Kakao => normalize_kakao(&provider.name, profile),
        ProfileShape::Naver => normalize_naver(&provider.name, profile),
    }
}

fn normalize_google(provider: &str, profile: &Value) -> Result<NormalizedIdentity, AuthError> {
    let external_id = string_field(profile, "sub").ok_or_else(|| missing(provider, "sub"))?;
    let display_name = string_field(profile, "name").ok_or_else(|| missing(provider, "name"))?;
    let email = string_field(profile, "email").ok_or_else(|| missing(provider, "email"))?;

    Ok(NormalizedIdentity {
        provider: provider.to_owned(),
        external_id,
        display_name,
        email,
    })
}

fn normalize_kakao(provider: &str, profile: &Value) -> Result<NormalizedIdentity, AuthError> {
    // Kakao serializes the account id as a JSON number.
    let external_id = id_field(profile, "id").ok_or_else(|| missing(provider, "id"))?;

    let account = profile.get("kakao_account");
    let email = account
        .and_then(|a| string_field(a, "email"))
        .unwrap_or_else(|| KAKAO_FALLBACK_EMAIL.to_owned());
    let display_name = account
        .and_then(|a| a.get("profile"))
        .and_then(|p| string_field(p, "nickname"))
        .unwrap_or_else(|| KAKAO_FALLBACK_NAME.to_owned());

    Ok(NormalizedIdentity {
        provider: provider.to_owned(),
        external_id,
        display_name,
        email,
    })
}

fn normalize_naver(provider: &str, profile: &Value) -> Result<NormalizedIdentity, AuthError> {
    let response = profile
        .get("response")
        .ok_or_else(|| missing(provider, "response"))?;

    let external_id = id_field(response, "id").ok_or_else(|| missing(provider, "response.id"))?;

    let email = string_field(response, "email")
        .unwrap_or_else(|| NAVER_FALLBACK_EMAIL.to_owned());
    let display_name = string_field(response, "name")
        .or_else(|| string_field(response, "nickname"))
        .unwrap_or_else(|| NAVER_FALLBACK_NAME.to_owned());

    Ok(NormalizedIdentity {
        provider: provider.to_owned(),
        external_id,
        display_name,
        email,
    })
}

/// Reads a string field, treating non-string values as absent.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Reads an identifier field that may arrive as a string or a number.
fn id_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn missing(provider: &str, field: &str) -> AuthError {
    AuthError::malformed(provider, format!("failed to retrieve profile: missing {field}"))
}

// =============================================================================
// Tests
// =============================================================================
