//! User application handlers.
//!
//! Lookup by wallet or email and the admin promotion command.

mod find_user;
mod promote_admin;

pub use find_user::find_by_wallet_or_email;
pub use promote_admin::{PromoteAdminCommand, PromoteAdminHandler, PromoteAdminResult};
