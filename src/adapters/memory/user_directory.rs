//! In-memory UserDirectory.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::{User, UserIdentifier};
use crate::ports::UserDirectory;

/// User store backed by a `Vec`.
///
/// Enforces the same uniqueness as the `users` table: one user per wallet
/// address and per email.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` if the wallet or email is already taken.
    pub async fn add(&self, user: User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let taken = users.iter().any(|existing| {
            (user.wallet_address().is_some() && existing.wallet_address() == user.wallet_address())
                || (user.email().is_some() && existing.email() == user.email())
        });
        if taken {
            return Err(DomainError::validation(
                "identifier",
                "wallet address or email already registered",
            ));
        }
        users.push(user);
        Ok(())
    }

    pub async fn get(&self, user_id: &UserId) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| &u.id() == user_id)
            .cloned()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_identifier(
        &self,
        identifier: &UserIdentifier,
    ) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.matches(identifier))
            .cloned())
    }

    async fn grant_admin(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| &u.id() == user_id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::UserNotFound, format!("user {}", user_id))
            })?;
        Ok(user.promote_to_admin())
    }
}
