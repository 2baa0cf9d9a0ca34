//! In-memory user storage backend.
//!
//! Keeps users in a process-local map behind an async `RwLock`. Useful for
//! tests and single-instance deployments; anything that needs durability
//! should implement [`UserStorage`] against a database instead.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::user::{User, UserStorage};
use crate::AuthResult;
use crate::error::AuthError;

/// In-memory implementation of [`UserStorage`].
#[derive(Debug, Default)]
pub struct MemoryUserStorage {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStorage {
    /// Creates a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if no users are stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn find_by_external_identity(
        &self,
        provider: &str,
        external_id: &str,
    ) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.provider == provider && u.external_id == external_id)
            .cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        // Duplicate check and insert happen under one write guard so racing
        // creates for the same provider identity cannot both succeed.
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.provider == user.provider && u.external_id == user.external_id)
        {
            return Err(AuthError::conflict(&user.provider, &user.external_id));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = MemoryUserStorage::new();
        let user = User::new("google", "108177", "Jane Tester", "jane@example.com");

        storage.create(&user).await.unwrap();

        let by_identity = storage
            .find_by_external_identity("google", "108177")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_identity.id, user.id);

        let by_id = storage.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.external_id, "108177");
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let storage = MemoryUserStorage::new();

        assert!(storage
            .find_by_external_identity("google", "nope")
            .await
            .unwrap()
            .is_none());
        assert!(storage.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_identity_is_conflict() {
        let storage = MemoryUserStorage::new();
        let first = User::new("kakao", "42", "Unknown User", "unknown@kakao.com");
        let second = User::new("kakao", "42", "Someone Else", "other@kakao.com");

        storage.create(&first).await.unwrap();
        let err = storage.create(&second).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_same_external_id_different_provider_is_allowed() {
        let storage = MemoryUserStorage::new();
        storage
            .create(&User::new("google", "42", "G", "g@example.com"))
            .await
            .unwrap();
        storage
            .create(&User::new("kakao", "42", "K", "k@example.com"))
            .await
            .unwrap();

        assert_eq!(storage.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_creates_produce_one_record() {
        let storage = MemoryUserStorage::new();
        let a = User::new("naver", "nv_1", "A", "a@naver.example");
        let b = User::new("naver", "nv_1", "B", "b@naver.example");

        let (ra, rb) = tokio::join!(storage.create(&a), storage.create(&b));

        assert!(ra.is_ok() != rb.is_ok());
        assert_eq!(storage.len().await, 1);
    }
}
