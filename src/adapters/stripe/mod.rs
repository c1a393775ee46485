//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for Stripe, including:
//! - Checkout session creation
//! - API error mapping
//! - A mock gateway for tests
//!
//! Webhook signature verification lives in the membership domain; this
//! module only supplies the signing secret through [`StripeConfig`].
//!
//! # Configuration
//!
//! Read through `PaymentConfig`:
//! - `TIERPASS__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `TIERPASS__PAYMENT__STRIPE_WEBHOOK_SECRET`: Webhook signing secret (whsec_...)

mod api_types;
mod mock_payment_gateway;
mod stripe_adapter;

pub use api_types::{map_error_response, StripeApiError, StripeCheckoutSession};
pub use mock_payment_gateway::MockPaymentGateway;
pub use stripe_adapter::{StripeConfig, StripePaymentGateway};
