//! UserDirectory port - resolves payer identifiers to users.
//!
//! Lookups take an already-normalized [`UserIdentifier`], so adapters only
//! compare lowercase values against lowercase storage.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::{User, UserIdentifier};

/// Port for user lookup and the admin flag.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by wallet address or email.
    ///
    /// Returns `None` if no user matches.
    async fn find_by_identifier(
        &self,
        identifier: &UserIdentifier,
    ) -> Result<Option<User>, DomainError>;

    /// Set the admin flag on a user.
    ///
    /// Returns `false` if the user was already an admin (no write performed).
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    /// - `DatabaseError` on persistence failure
    async fn grant_admin(&self, user_id: &UserId) -> Result<bool, DomainError>;
}
