//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `membership` - Checkout metadata, webhook verification and reconciliation
//! - `user` - Payer identity and identifier normalization

pub mod foundation;
pub mod membership;
pub mod user;
