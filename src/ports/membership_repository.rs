//! MembershipRepository port - persistence for memberships.
//!
//! The unique constraint on `stripe_session_id` is the only concurrency
//! guard for reconciliation. Implementations must make
//! [`MembershipRepository::insert`] atomic with respect to that key and
//! report a lost race as [`InsertResult::AlreadyExists`] rather than an
//! error.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::membership::Membership;

/// Result of attempting to insert a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Row was inserted (first delivery for this session).
    Inserted,
    /// A row for the same session already exists.
    AlreadyExists,
}

/// Repository port for Membership persistence.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert a membership keyed by its checkout session id.
    ///
    /// Uses `ON CONFLICT DO NOTHING` semantics on `stripe_session_id`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on any failure other than the session duplicate
    async fn insert(&self, membership: &Membership) -> Result<InsertResult, DomainError>;

    /// Find the membership paid for by a checkout session.
    async fn find_by_session_id(&self, session_id: &str)
        -> Result<Option<Membership>, DomainError>;

    /// All memberships owned by a user, newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Membership>, DomainError>;
}
