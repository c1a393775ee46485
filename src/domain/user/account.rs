//! User account as seen by the membership flow.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId, ValidationError};

use super::identifier::{Email, UserIdentifier, WalletAddress};

/// A registered user.
///
/// # Invariants
///
/// - At least one of `email` / `wallet_address` is present
/// - `wallet_address` is stored lowercase (enforced by [`WalletAddress`])
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: Option<Email>,
    wallet_address: Option<WalletAddress>,
    is_admin: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl User {
    /// Creates a new non-admin user.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if neither email nor wallet is given.
    pub fn new(
        email: Option<Email>,
        wallet_address: Option<WalletAddress>,
    ) -> Result<Self, ValidationError> {
        let now = Timestamp::now();
        Self::reconstitute(UserId::new(), email, wallet_address, false, now, now)
    }

    /// Rebuilds a user from stored fields, re-checking invariants.
    pub fn reconstitute(
        id: UserId,
        email: Option<Email>,
        wallet_address: Option<WalletAddress>,
        is_admin: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if email.is_none() && wallet_address.is_none() {
            return Err(ValidationError::empty_field("email_or_wallet_address"));
        }
        Ok(Self {
            id,
            email,
            wallet_address,
            is_admin,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    pub fn wallet_address(&self) -> Option<&WalletAddress> {
        self.wallet_address.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns true if this user is addressed by the given identifier.
    pub fn matches(&self, identifier: &UserIdentifier) -> bool {
        match identifier {
            UserIdentifier::Wallet(w) => self.wallet_address.as_ref() == Some(w),
            UserIdentifier::Email(e) => self.email.as_ref() == Some(e),
        }
    }

    /// Grants admin rights.
    ///
    /// Returns `false` without touching `updated_at` if the user already is
    /// an admin.
    pub fn promote_to_admin(&mut self) -> bool {
        if self.is_admin {
            return false;
        }
        self.is_admin = true;
        self.updated_at = Timestamp::now();
        true
    }
}
