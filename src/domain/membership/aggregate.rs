//! Membership aggregate entity.
//!
//! A Membership is the local record of a paid checkout session. It is
//! created only by webhook reconciliation, never speculatively.
//!
//! # Design Decisions
//!
//! - **One per checkout session**: unique constraint on `stripe_session_id`
//!   enforced at database level; duplicates resolve to the existing row
//! - **Money in minor units**: `amount_total` is an i64 (cents), never a float
//! - **Many per user**: a user may buy several tiers or levels over time

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MembershipId, Timestamp, UserId};

use super::checkout::CompletedCheckout;
use super::{MembershipLevel, MembershipStatus, MembershipTier};

/// Membership aggregate - a tier/level grant tied to one payment session.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `stripe_session_id` is unique and non-empty
/// - Created `Active`; reconciliation never rewrites an existing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Unique identifier for this membership.
    pub id: MembershipId,

    /// User who owns this membership.
    pub user_id: UserId,

    /// Purchased tier.
    pub tier: MembershipTier,

    /// Purchased level within the tier.
    pub level: MembershipLevel,

    /// Checkout session that paid for this membership.
    pub stripe_session_id: String,

    /// Current status.
    pub status: MembershipStatus,

    /// Amount paid in minor currency units, if the provider reported it.
    pub amount_total: Option<i64>,

    /// Lowercase ISO currency code, if the provider reported it.
    pub currency: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Membership {
    /// Creates an active membership for a completed checkout.
    pub fn from_checkout(user_id: UserId, checkout: &CompletedCheckout) -> Self {
        let now = Timestamp::now();
        Self {
            id: MembershipId::new(),
            user_id,
            tier: checkout.metadata.tier.clone(),
            level: checkout.metadata.level.clone(),
            stripe_session_id: checkout.session_id.clone(),
            status: MembershipStatus::Active,
            amount_total: checkout.amount_total,
            currency: checkout.currency.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this membership grants access.
    pub fn has_access(&self) -> bool {
        self.status.has_access()
    }
}
