//! Session token issuance and verification.
//!
//! After a successful federated login the server issues its own HS256-signed
//! JWT carrying the local user snapshot. Provider access tokens never leave
//! the login flow; this session token is the only credential clients hold.
//!
//! # Example
//!
//! ```ignore
//! use authbridge_auth::session::SessionService;
//!
//! let sessions = SessionService::new(&config.session);
//! let token = sessions.issue(&user)?;
//! let claims = sessions.verify(&token)?;
//! assert_eq!(claims.email, user.email);
//! ```

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::storage::User;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during session token operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token is structurally invalid.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of what is wrong with the token.
        message: String,
    },

    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },
}

impl SessionError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Returns `true` if this error means the presented token was rejected.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Expired | Self::InvalidSignature | Self::Malformed { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Session Claims
// ============================================================================

/// Claims carried by a session token.
///
/// The claim set is a snapshot of the user at login time. Wire names are
/// camelCase; `sub` duplicates the email for JWT-standard consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Subject, set to the user's email address.
    pub sub: String,

    /// Local user identifier.
    pub user_id: Uuid,

    /// Display name.
    pub username: String,

    /// Email address.
    pub email: String,

    /// Provider that authenticated the user.
    pub provider: String,

    /// Account identifier at the provider.
    pub external_id: String,

    /// Whether the account was active at issuance.
    pub is_active: bool,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims for a user with the given lifetime.
    #[must_use]
    pub fn for_user(user: &User, ttl: Duration) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: user.email.clone(),
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            provider: user.provider.clone(),
            external_id: user.external_id.clone(),
            is_active: user.is_active,
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }
}

// ============================================================================
// Session Service
// ============================================================================

/// Service for issuing and verifying session tokens.
///
/// Thread-safe (`Send + Sync`); share it behind an `Arc`.
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionService {
    /// Creates a new service from the session configuration.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::from_secret(config.secret.as_bytes(), config.ttl)
    }

    /// Creates a new service from a raw signing secret and token lifetime.
    #[must_use]
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed session token for a user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Encoding` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, SessionError> {
        let claims = SessionClaims::for_user(user, self.ttl);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SessionError::encoding(e.to_string()))
    }

    /// Verifies a session token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Expired`, `SessionError::InvalidSignature`, or
    /// `SessionError::Malformed` depending on why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway; exp is a hard boundary.
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(SessionError::from)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> SessionService {
        SessionService::from_secret(b"test-secret-with-enough-length", Duration::from_secs(3600))
    }

    fn test_user() -> User {
        User::new("google", "108177", "Jane Tester", "jane@example.com")
    }

    fn encode_claims(claims: &SessionClaims, secret: &[u8]) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = test_service();
        let user = test_user();

        let token = service.issue(&user).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, "jane@example.com");
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.username, "Jane Tester");
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.provider, "google");
        assert_eq!(claims.external_id, "108177");
        assert!(claims.is_active);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_inactive_flag_is_preserved() {
        let service = test_service();
        let user = User::builder("google", "108177", "Jane", "jane@example.com")
            .active(false)
            .build();

        let claims = service.verify(&service.issue(&user).unwrap()).unwrap();
        assert!(!claims.is_active);
    }

    #[test]
    fn test_claim_names_are_camel_case() {
        let claims = SessionClaims::for_user(&test_user(), Duration::from_secs(60));
        let json = serde_json::to_string(&claims).unwrap();

        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"externalId\""));
        assert!(json.contains("\"isActive\""));
        assert!(!json.contains("\"user_id\""));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = test_service();
        let mut claims = SessionClaims::for_user(&test_user(), Duration::from_secs(3600));
        claims.exp = OffsetDateTime::now_utc().unix_timestamp() - 1;

        let token = encode_claims(&claims, b"test-secret-with-enough-length");
        let result = service.verify(&token);

        assert!(matches!(result.unwrap_err(), SessionError::Expired));
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        let service = test_service();
        let mut claims = SessionClaims::for_user(&test_user(), Duration::from_secs(3600));
        claims.exp = OffsetDateTime::now_utc().unix_timestamp() + 2;

        let token = encode_claims(&claims, b"test-secret-with-enough-length");
        assert!(service.verify(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = test_service();
        let claims = SessionClaims::for_user(&test_user(), Duration::from_secs(3600));

        let token = encode_claims(&claims, b"a-completely-different-secret");
        let result = service.verify(&token);

        assert!(matches!(result.unwrap_err(), SessionError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = test_service();

        let result = service.verify("not.a.jwt");
        assert!(matches!(result.unwrap_err(), SessionError::Malformed { .. }));
    }

    #[test]
    fn test_error_predicates() {
        assert!(SessionError::Expired.is_rejection());
        assert!(SessionError::InvalidSignature.is_rejection());
        assert!(SessionError::malformed("bad").is_rejection());
        assert!(!SessionError::encoding("key").is_rejection());
    }
}
