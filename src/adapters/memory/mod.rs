//! In-memory adapters for development and tests.
//!
//! - `InMemoryMembershipRepository` - session-keyed membership store
//! - `InMemoryUserDirectory` - user list with wallet/email lookup

mod membership_repository;
mod user_directory;

pub use membership_repository::InMemoryMembershipRepository;
pub use user_directory::InMemoryUserDirectory;
