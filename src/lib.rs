//! Tierpass - Membership checkout and Stripe webhook reconciliation
//!
//! Creates hosted Stripe checkout sessions carrying tier, level and wallet
//! metadata, verifies signed webhook deliveries, and turns each completed
//! checkout into exactly one membership for the paying user.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
