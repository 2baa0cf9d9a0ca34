//! Authenticated caller view.
//!
//! [`Principal`] is the request-scoped identity handlers work with. It wraps
//! the verified session claims; nothing here touches storage, so carrying a
//! `Principal` is free of I/O.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::CredentialErrorKind;
use crate::session::SessionClaims;

// =============================================================================
// Principal
// =============================================================================

/// The authenticated caller of a request.
///
/// Built by the authorization gate from verified session claims and read
/// back by handlers through the extractor impls in
/// [`crate::middleware::auth`]. Cloning is cheap; the claims live behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct Principal {
    claims: Arc<SessionClaims>,
}

impl Principal {
    /// Creates a principal from verified claims.
    #[must_use]
    pub fn new(claims: SessionClaims) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }

    /// Returns the full claim set.
    #[must_use]
    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    /// Returns the local user identifier.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.claims.user_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.claims.username
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.claims.email
    }

    /// Returns the provider that authenticated the caller.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.claims.provider
    }

    /// Returns the caller's account identifier at the provider.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.claims.external_id
    }

    /// Returns `true` if the account was active at token issuance.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.claims.is_active
    }

    /// Returns the token subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }
}

/// Why the gate rejected the presented token, stashed in request extensions
/// so the `Principal` extractor can answer with the precise 401 reason.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CredentialRejection(pub(crate) CredentialErrorKind);

// =============================================================================
// Optional Principal
// =============================================================================

/// Extractor wrapper that yields `None` instead of failing.
///
/// Useful for endpoints that behave differently for authenticated and
/// anonymous callers.
#[derive(Debug, Clone)]
pub struct OptionalPrincipal(pub Option<Principal>);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::User;
    use std::time::Duration;

    fn test_principal() -> Principal {
        let user = User::new("google", "108177", "Jane Tester", "jane@example.com");
        Principal::new(SessionClaims::for_user(&user, Duration::from_secs(60)))
    }

    #[test]
    fn test_accessors_mirror_claims() {
        let principal = test_principal();

        assert_eq!(principal.username(), "Jane Tester");
        assert_eq!(principal.email(), "jane@example.com");
        assert_eq!(principal.provider(), "google");
        assert_eq!(principal.external_id(), "108177");
        assert_eq!(principal.subject(), "jane@example.com");
        assert!(principal.is_active());
        assert_eq!(principal.user_id(), principal.claims().user_id);
    }

    #[test]
    fn test_clone_shares_claims() {
        let principal = test_principal();
        let cloned = principal.clone();

        assert_eq!(principal.user_id(), cloned.user_id());
        assert!(Arc::ptr_eq(&principal.claims, &cloned.claims));
    }
}
