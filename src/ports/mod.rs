//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - Checkout session creation at the payment provider
//! - `MembershipRepository` - Membership persistence keyed by checkout session
//! - `UserDirectory` - User lookup by wallet or email, admin flag

mod membership_repository;
mod payment_gateway;
mod user_directory;

pub use membership_repository::{InsertResult, MembershipRepository};
pub use payment_gateway::{
    CheckoutSessionHandle, CreateCheckoutRequest, LineItem, PaymentError, PaymentErrorCode,
    PaymentGateway,
};
pub use user_directory::UserDirectory;
