//! Membership domain module.
//!
//! Checkout metadata, webhook verification and the reconciliation state
//! machine that turns a paid checkout session into a membership.
//!
//! # Module Structure
//!
//! - `aggregate` - Membership aggregate entity
//! - `checkout` - Checkout metadata and completed-session extraction
//! - `reconciliation` - Per-session Pending/Completed/Reconciled/Failed tracker
//! - `status` - Stored membership status
//! - `tier` - Tier and level labels
//! - `webhook_*` - Signature verification, errors and dispatch

mod aggregate;
mod checkout;
mod errors;
mod reconciliation;
mod status;
mod stripe_event;
mod tier;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use aggregate::Membership;
pub use checkout::{
    CheckoutMetadata, CompletedCheckout, PaymentStatus, METADATA_LEVEL, METADATA_TIER,
    METADATA_WALLET_ADDRESS,
};
pub use errors::MembershipError;
pub use reconciliation::{ReconciliationState, SessionReconciliation};
pub use status::MembershipStatus;
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
#[cfg(test)]
pub(crate) use stripe_event::StripeEventBuilder;
pub use tier::{MembershipLevel, MembershipTier};
pub use webhook_errors::WebhookError;
pub use webhook_processor::{
    HandlerRegistry, WebhookDispatcher, WebhookEventHandler, WebhookOutcome,
};
pub use webhook_verifier::{verify, SignatureHeader, StripeWebhookVerifier};
