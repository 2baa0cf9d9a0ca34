//! HTTP responses for authentication errors.
//!
//! Implements `IntoResponse` for [`AuthError`] using the same envelope as
//! the success responses: `{"status": ..., "message": ..., "data": null}`.
//! Provider response bodies never appear here; they are logged at debug
//! level where the error is raised.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{AuthError, CredentialErrorKind};

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = error_details(&self);

        let body = json!({
            "status": status.as_u16(),
            "message": message,
            "data": null,
        });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let kind = match &self {
                AuthError::InvalidCredential { kind } => Some(*kind),
                _ => None,
            };
            if let Ok(value) = HeaderValue::from_str(&build_www_authenticate_header(kind)) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an error to its HTTP status and public message.
///
/// The upstream family maps to 502: the provider, not this service, failed
/// the login. Raw response bodies are withheld; the `Display` text of the
/// upstream variants carries the provider name and status only.
fn error_details(error: &AuthError) -> (StatusCode, String) {
    let status = match error {
        AuthError::ProviderNotSupported { .. } => StatusCode::BAD_REQUEST,
        AuthError::Upstream { .. }
        | AuthError::OAuthRejected { .. }
        | AuthError::Network(_)
        | AuthError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
        AuthError::InvalidCredential { .. } => StatusCode::UNAUTHORIZED,
        AuthError::Conflict { .. } | AuthError::Storage { .. } | AuthError::Configuration { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, error.to_string())
}

/// Builds the `WWW-Authenticate` challenge for 401 responses.
///
/// A request that presented no credential gets a bare challenge; a rejected
/// token also names the rejection reason.
fn build_www_authenticate_header(kind: Option<CredentialErrorKind>) -> String {
    match kind {
        None | Some(CredentialErrorKind::Missing) => "Bearer realm=\"authbridge\"".to_string(),
        Some(kind) => format!(
            "Bearer realm=\"authbridge\", error=\"invalid_token\", error_description=\"{kind}\""
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_provider_is_bad_request() {
        let response = AuthError::provider_not_supported("github").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["status"], 400);
        assert_eq!(json["message"], "Unsupported provider: github");
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_upstream_error_is_bad_gateway_without_body_leak() {
        let response = AuthError::upstream("kakao", 500, "secret internals").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["status"], 502);
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("kakao"));
        assert!(!message.contains("secret internals"));
    }

    #[tokio::test]
    async fn test_profile_failure_message_is_surfaced() {
        let response =
            AuthError::malformed("google", "failed to retrieve profile: missing email")
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .contains("failed to retrieve profile")
        );
    }

    #[tokio::test]
    async fn test_expired_credential_is_unauthorized_with_challenge() {
        let response =
            AuthError::invalid_credential(CredentialErrorKind::Expired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(www_auth.contains("Bearer"));
        assert!(www_auth.contains("error=\"invalid_token\""));
        assert!(www_auth.contains("expired"));
    }

    #[tokio::test]
    async fn test_missing_credential_gets_bare_challenge() {
        let response =
            AuthError::invalid_credential(CredentialErrorKind::Missing).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(www_auth, "Bearer realm=\"authbridge\"");
    }

    #[tokio::test]
    async fn test_storage_error_is_internal() {
        let response = AuthError::storage("pool exhausted").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !response.headers().contains_key(header::WWW_AUTHENTICATE),
            "500 responses carry no challenge"
        );
    }
}
