//! Credential store abstraction

use async_trait::async_trait;
use taskgate_db::{Database, DbError, NewUser, User};

use crate::error::AuthError;

/// Persistence for user credentials
///
/// `insert` must be atomic with respect to username uniqueness: a conflicting
/// insert fails with `AuthError::DuplicateIdentifier` and leaves the store
/// unchanged.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Insert a new user
    async fn insert(&self, user: NewUser) -> Result<User, AuthError>;
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.get_user_by_username(username).await?)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AuthError> {
        self.insert_user(user).await.map_err(|e| match e {
            DbError::Duplicate(_) => AuthError::DuplicateIdentifier,
            other => AuthError::Store(other),
        })
    }
}
