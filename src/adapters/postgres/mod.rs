//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresMembershipRepository` - Memberships keyed by checkout session
//! - `PostgresUserDirectory` - Case-insensitive user lookup and admin flag
//! - `create_pool` / `run_migrations` - Pool setup from `DatabaseConfig`

mod membership_repository;
mod pool;
mod user_directory;

pub use membership_repository::PostgresMembershipRepository;
pub use pool::{create_pool, run_migrations};
pub use user_directory::PostgresUserDirectory;
