//! User record and storage trait.
//!
//! Defines the persistent shape of a federated user and the interface
//! storage backends implement. Users are keyed internally by a generated
//! UUID; the `(provider, external_id)` pair is the natural key that links
//! a record back to the provider account it came from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;

// =============================================================================
// User Type
// =============================================================================

/// A user provisioned through federated login.
///
/// Records are created on first login and looked up by their provider
/// identity on every subsequent login. There is no password; the provider
/// is the only authentication authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,

    /// Display name taken from the provider profile at first login.
    pub username: String,

    /// Email address, possibly a provider placeholder value.
    pub email: String,

    /// Canonical name of the provider that authenticated this user.
    pub provider: String,

    /// Stable account identifier at the provider.
    pub external_id: String,

    /// Whether the account is active. Inactive users cannot authenticate.
    pub is_active: bool,

    /// Optional reference to an owning organization record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_ref: Option<String>,

    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new active user from a provider identity.
    ///
    /// A new UUID is generated as the ID and both timestamps are set to now.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        external_id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            provider: provider.into(),
            external_id: external_id.into(),
            is_active: true,
            organization_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user builder.
    #[must_use]
    pub fn builder(
        provider: impl Into<String>,
        external_id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> UserBuilder {
        UserBuilder::new(provider, external_id, username, email)
    }
}

// =============================================================================
// User Builder
// =============================================================================

/// Builder for creating `User` instances.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    fn new(
        provider: impl Into<String>,
        external_id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user: User::new(provider, external_id, username, email),
        }
    }

    /// Sets the user ID.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.user.id = id;
        self
    }

    /// Sets the organization reference.
    #[must_use]
    pub fn organization_ref(mut self, organization_ref: impl Into<String>) -> Self {
        self.user.organization_ref = Some(organization_ref.into());
        self
    }

    /// Sets whether the user is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.user.is_active = active;
        self
    }

    /// Builds the user.
    #[must_use]
    pub fn build(self) -> User {
        self.user
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage operations for federated users.
///
/// Implementations must uphold one invariant: at most one user exists per
/// `(provider, external_id)` pair. `create` is the enforcement point and
/// must reject duplicates atomically, so two racing first logins for the
/// same account produce exactly one record.
///
/// # Example
///
/// ```ignore
/// use authbridge_auth::storage::UserStorage;
///
/// async fn example(storage: &impl UserStorage) {
///     if let Some(user) = storage.find_by_external_identity("google", "108177").await? {
///         println!("Returning user: {}", user.username);
///     }
/// }
/// ```
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their provider identity.
    ///
    /// Returns `None` if no user is linked to the given provider account.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_external_identity(
        &self,
        provider: &str,
        external_id: &str,
    ) -> AuthResult<Option<User>>;

    /// Find a user by their unique ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>>;

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if a user already exists for the same
    /// `(provider, external_id)` pair, or `AuthError::Storage` if the
    /// operation fails.
    async fn create(&self, user: &User) -> AuthResult<()>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("google", "108177", "Jane Tester", "jane@example.com");
        assert_eq!(user.provider, "google");
        assert_eq!(user.external_id, "108177");
        assert_eq!(user.username, "Jane Tester");
        assert_eq!(user.email, "jane@example.com");
        assert!(user.is_active);
        assert!(user.organization_ref.is_none());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_user_builder() {
        let id = Uuid::new_v4();
        let user = User::builder("kakao", "42", "Unknown User", "unknown@kakao.com")
            .id(id)
            .organization_ref("org-7")
            .active(false)
            .build();

        assert_eq!(user.id, id);
        assert_eq!(user.provider, "kakao");
        assert_eq!(user.organization_ref, Some("org-7".to_string()));
        assert!(!user.is_active);
    }

    #[test]
    fn test_user_ids_are_unique() {
        let a = User::new("google", "1", "a", "a@example.com");
        let b = User::new("google", "2", "b", "b@example.com");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_user_serialization() {
        let user = User::new("naver", "nv_1", "네이버사용자", "user@naver.example");

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("naver"));
        assert!(json.contains("nv_1"));
        // Timestamps serialize as RFC 3339, organization_ref is omitted when unset.
        assert!(json.contains("created_at"));
        assert!(!json.contains("organization_ref"));

        let round: User = serde_json::from_str(&json).unwrap();
        assert_eq!(round.id, user.id);
        assert_eq!(round.external_id, user.external_id);
    }
}
