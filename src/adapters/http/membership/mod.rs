//! HTTP adapter for membership endpoints.
//!
//! - `POST /api/stripe/webhook` - Handle Stripe webhooks
//! - `POST /api/stripe/checkout` - Start paid checkout flow
//! - `GET /api/users/:identifier/memberships` - List a user's memberships

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{AppState, MembershipApiError, WebhookApiError, STRIPE_SIGNATURE_HEADER};
pub use routes::membership_router;
