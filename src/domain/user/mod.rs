//! User module - payer identity.
//!
//! Users are addressed by wallet address or email. Both are normalized by
//! a single function, [`normalize_identifier`], so every comparison in the
//! system sees the same lowercase form.

mod identifier;
mod account;

pub use identifier::{normalize_identifier, Email, UserIdentifier, WalletAddress};
pub use account::User;
