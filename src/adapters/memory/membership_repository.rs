//! In-memory MembershipRepository.
//!
//! Keyed by checkout session id under a single write lock, which gives the
//! same insert-or-report-duplicate semantics as the Postgres unique index.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::membership::Membership;
use crate::ports::{InsertResult, MembershipRepository};

/// Membership store backed by a `HashMap`.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipRepository {
    by_session: Arc<RwLock<HashMap<String, Membership>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert fail with `DatabaseError`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored memberships.
    pub async fn count(&self) -> usize {
        self.by_session.read().await.len()
    }

    /// Snapshot of all stored memberships.
    pub async fn all(&self) -> Vec<Membership> {
        self.by_session.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn insert(&self, membership: &Membership) -> Result<InsertResult, DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "simulated write failure",
            ));
        }

        let mut by_session = self.by_session.write().await;
        if by_session.contains_key(&membership.stripe_session_id) {
            return Ok(InsertResult::AlreadyExists);
        }
        by_session.insert(membership.stripe_session_id.clone(), membership.clone());
        Ok(InsertResult::Inserted)
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<Membership>, DomainError> {
        Ok(self.by_session.read().await.get(session_id).cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Membership>, DomainError> {
        let mut memberships: Vec<Membership> = self
            .by_session
            .read()
            .await
            .values()
            .filter(|m| &m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(memberships)
    }
}
