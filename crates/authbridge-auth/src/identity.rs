//! Identity resolution for federated logins.
//!
//! Maps a [`NormalizedIdentity`] coming out of a provider login to a local
//! [`User`] record, provisioning one on first login. Subsequent logins
//! return the existing record unchanged; profile edits at the provider do
//! not overwrite local data.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use authbridge_auth::identity::IdentityResolver;
//! use authbridge_auth::storage::MemoryUserStorage;
//!
//! let resolver = IdentityResolver::new(Arc::new(MemoryUserStorage::new()));
//! let user = resolver.resolve(&identity).await?;
//! ```

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::federation::NormalizedIdentity;
use crate::storage::{User, UserStorage};

/// Resolves provider identities to local user records.
pub struct IdentityResolver {
    storage: Arc<dyn UserStorage>,
}

impl IdentityResolver {
    /// Creates a new resolver backed by the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn UserStorage>) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage handle.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn UserStorage> {
        Arc::clone(&self.storage)
    }

    /// Finds the user linked to this identity, creating one on first login.
    ///
    /// New users are active and take their username and email from the
    /// normalized profile. When two logins race on the same first-time
    /// identity, the loser of the create re-reads and returns the winner's
    /// record, so both calls resolve to the same user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the backend fails.
    pub async fn resolve(&self, identity: &NormalizedIdentity) -> AuthResult<User> {
        if let Some(user) = self
            .storage
            .find_by_external_identity(&identity.provider, &identity.external_id)
            .await?
        {
            return Ok(user);
        }

        let user = User::new(
            &identity.provider,
            &identity.external_id,
            &identity.display_name,
            &identity.email,
        );

        match self.storage.create(&user).await {
            Ok(()) => {
                tracing::info!(
                    provider = %identity.provider,
                    external_id = %identity.external_id,
                    user_id = %user.id,
                    "Provisioned user from federated login"
                );
                Ok(user)
            }
            Err(AuthError::Conflict { .. }) => {
                // Lost a first-login race; the winner's record is authoritative.
                self.storage
                    .find_by_external_identity(&identity.provider, &identity.external_id)
                    .await?
                    .ok_or_else(|| {
                        AuthError::storage("user disappeared after conflicting create")
                    })
            }
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryUserStorage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn identity(provider: &str, external_id: &str) -> NormalizedIdentity {
        NormalizedIdentity {
            provider: provider.to_string(),
            external_id: external_id.to_string(),
            display_name: "Jane Tester".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_login_provisions_user() {
        let storage = Arc::new(MemoryUserStorage::new());
        let resolver = IdentityResolver::new(storage.clone());

        let user = resolver.resolve(&identity("google", "108177")).await.unwrap();
        assert_eq!(user.provider, "google");
        assert_eq!(user.external_id, "108177");
        assert_eq!(user.username, "Jane Tester");
        assert_eq!(user.email, "jane@example.com");
        assert!(user.is_active);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_login_returns_existing_user() {
        let resolver = IdentityResolver::new(Arc::new(MemoryUserStorage::new()));

        let first = resolver.resolve(&identity("google", "108177")).await.unwrap();

        let mut changed = identity("google", "108177");
        changed.display_name = "Jane Renamed".to_string();
        let second = resolver.resolve(&changed).await.unwrap();

        assert_eq!(second.id, first.id);
        // Local record keeps its first-login profile.
        assert_eq!(second.username, "Jane Tester");
    }

    #[tokio::test]
    async fn test_concurrent_first_logins_resolve_to_one_user() {
        let resolver = Arc::new(IdentityResolver::new(Arc::new(MemoryUserStorage::new())));
        let id = identity("naver", "nv_1");

        let (a, b) = tokio::join!(resolver.resolve(&id), resolver.resolve(&id));

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.id, b.id);
    }

    /// Storage stub that forces the create-conflict path: the first lookup
    /// misses, the create collides, and the retry lookup finds the winner.
    struct RacingStorage {
        winner: User,
        lookups: Mutex<u32>,
    }

    #[async_trait]
    impl UserStorage for RacingStorage {
        async fn find_by_external_identity(
            &self,
            _provider: &str,
            _external_id: &str,
        ) -> AuthResult<Option<User>> {
            let mut lookups = self.lookups.lock().unwrap();
            *lookups += 1;
            if *lookups == 1 {
                Ok(None)
            } else {
                Ok(Some(self.winner.clone()))
            }
        }

        async fn find_by_id(&self, _user_id: uuid::Uuid) -> AuthResult<Option<User>> {
            Ok(None)
        }

        async fn create(&self, user: &User) -> AuthResult<()> {
            Err(AuthError::conflict(&user.provider, &user.external_id))
        }
    }

    #[tokio::test]
    async fn test_lost_race_returns_winner() {
        let winner = User::new("kakao", "42", "Winner", "winner@kakao.example");
        let storage = Arc::new(RacingStorage {
            winner: winner.clone(),
            lookups: Mutex::new(0),
        });
        let resolver = IdentityResolver::new(storage);

        let resolved = resolver.resolve(&identity("kakao", "42")).await.unwrap();
        assert_eq!(resolved.id, winner.id);
        assert_eq!(resolved.username, "Winner");
    }
}
