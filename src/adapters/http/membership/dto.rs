//! HTTP DTOs (Data Transfer Objects) for checkout, webhook and membership
//! endpoints.
//!
//! Field names are camelCase on the wire to match the front end.

use serde::{Deserialize, Serialize};

use crate::application::handlers::membership::{
    CreateCheckoutCommand, HandlePaymentWebhookResult, ListMembershipsResult,
};
use crate::domain::membership::Membership;
use crate::ports::{CheckoutSessionHandle, LineItem};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One line of a checkout request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemRequest {
    pub name: String,
    /// Minor currency units (cents).
    pub unit_amount: i64,
    pub currency: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Request to start a hosted checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutRequest {
    pub items: Vec<CheckoutItemRequest>,
    pub tier: String,
    pub level: String,
    pub wallet_address: String,
}

impl From<StartCheckoutRequest> for CreateCheckoutCommand {
    fn from(request: StartCheckoutRequest) -> Self {
        Self {
            items: request
                .items
                .into_iter()
                .map(|item| LineItem {
                    name: item.name,
                    unit_amount: item.unit_amount,
                    currency: item.currency,
                    quantity: item.quantity,
                })
                .collect(),
            tier: request.tier,
            level: request.level,
            wallet_address: request.wallet_address,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for checkout creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    /// Hosted checkout page.
    pub url: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

impl From<CheckoutSessionHandle> for CheckoutResponse {
    fn from(session: CheckoutSessionHandle) -> Self {
        Self {
            session_id: session.id,
            url: session.url,
            amount_total: session.amount_total,
            currency: session.currency,
        }
    }
}

/// Acknowledgement returned to the payment provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAckResponse {
    pub received: bool,
    pub event_id: String,
    pub event_type: String,
    /// `membership_created`, `already_reconciled` or `acknowledged`.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<String>,
}

impl From<HandlePaymentWebhookResult> for WebhookAckResponse {
    fn from(result: HandlePaymentWebhookResult) -> Self {
        Self {
            received: true,
            membership_id: result.outcome.membership().map(|m| m.id.to_string()),
            outcome: result.outcome.label(),
            event_id: result.event_id,
            event_type: result.event_type,
        }
    }
}

/// A membership as exposed to the front end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    pub id: String,
    pub tier: String,
    pub level: String,
    pub status: String,
    pub has_access: bool,
    pub stripe_session_id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    /// ISO 8601.
    pub created_at: String,
}

impl From<&Membership> for MembershipView {
    fn from(membership: &Membership) -> Self {
        Self {
            id: membership.id.to_string(),
            tier: membership.tier.as_str().to_string(),
            level: membership.level.as_str().to_string(),
            status: membership.status.as_str().to_string(),
            has_access: membership.has_access(),
            stripe_session_id: membership.stripe_session_id.clone(),
            amount_total: membership.amount_total,
            currency: membership.currency.clone(),
            created_at: membership.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for `GET /api/users/:identifier/memberships`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMembershipsResponse {
    pub user_id: String,
    pub wallet_address: Option<String>,
    pub email: Option<String>,
    /// Newest first.
    pub memberships: Vec<MembershipView>,
}

impl From<ListMembershipsResult> for UserMembershipsResponse {
    fn from(result: ListMembershipsResult) -> Self {
        Self {
            user_id: result.user.id().to_string(),
            wallet_address: result.user.wallet_address().map(|w| w.as_str().to_string()),
            email: result.user.email().map(|e| e.as_str().to_string()),
            memberships: result.memberships.iter().map(MembershipView::from).collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable code for programmatic handling.
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
