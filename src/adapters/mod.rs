//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum routes, DTOs and middleware
//! - `memory` - In-memory stores for development and tests
//! - `postgres` - PostgreSQL persistence
//! - `stripe` - Stripe checkout API

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use http::{app_router, AppState};
pub use memory::{InMemoryMembershipRepository, InMemoryUserDirectory};
pub use postgres::{PostgresMembershipRepository, PostgresUserDirectory};
pub use stripe::{MockPaymentGateway, StripeConfig, StripePaymentGateway};
