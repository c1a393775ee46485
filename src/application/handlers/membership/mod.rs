//! Membership handlers.
//!
//! Command and query handlers for the checkout-to-membership flow:
//!
//! ## Commands
//! - Creating checkout sessions at the payment provider
//! - Processing payment webhooks (verify, then dispatch)
//! - Reconciling completed checkouts into memberships
//!
//! ## Queries
//! - Listing a user's memberships

mod create_checkout;
mod handle_payment_webhook;
mod list_memberships;
mod reconcile_membership;

// Commands
pub use create_checkout::{CreateCheckoutCommand, CreateCheckoutHandler, CreateCheckoutResult};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use reconcile_membership::{MembershipReconciler, ReconcileReport};

// Queries
pub use list_memberships::{ListMembershipsHandler, ListMembershipsQuery, ListMembershipsResult};
