//! Payer identifiers: wallet addresses and email addresses.
//!
//! Every identifier that enters the system, whether from checkout metadata,
//! a webhook payload, or the admin CLI, passes through
//! [`normalize_identifier`] before it is compared or stored. Storage keeps
//! the same lowercase form, so lookups are case-insensitive.
//!
//! # Validation Rules
//!
//! - Wallet: `0x` followed by 40 hex characters (EVM address)
//! - Email: exactly one `@` with non-empty local part and domain

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Length of an EVM address including the `0x` prefix.
const WALLET_ADDRESS_LEN: usize = 42;

/// Maximum accepted email length (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

/// Canonical form of a user identifier: surrounding whitespace removed and
/// lowercased.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// An EVM wallet address in canonical lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parses and normalizes a wallet address.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is empty, has the wrong length,
    /// lacks the `0x` prefix, or contains non-hex characters.
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_identifier(raw);
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("wallet_address"));
        }
        if normalized.len() != WALLET_ADDRESS_LEN {
            return Err(ValidationError::out_of_range(
                "wallet_address_length",
                WALLET_ADDRESS_LEN as i32,
                WALLET_ADDRESS_LEN as i32,
                normalized.len() as i32,
            ));
        }
        let Some(hex_part) = normalized.strip_prefix("0x") else {
            return Err(ValidationError::invalid_format(
                "wallet_address",
                "must start with 0x",
            ));
        };
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::invalid_format(
                "wallet_address",
                "hex characters only",
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

/// An email address in canonical lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parses and normalizes an email address.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is empty, too long, or not of
    /// the form `local@domain`.
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_identifier(raw);
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if normalized.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::out_of_range(
                "email_length",
                3,
                MAX_EMAIL_LEN as i32,
                normalized.len() as i32,
            ));
        }
        match normalized.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !normalized.contains(char::is_whitespace) =>
            {
                Ok(Self(normalized))
            }
            _ => Err(ValidationError::invalid_format(
                "email",
                "expected local@domain",
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// A lookup key for the user directory: either a wallet or an email.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserIdentifier {
    Wallet(WalletAddress),
    Email(Email),
}

impl UserIdentifier {
    /// Classifies and validates a raw identifier.
    ///
    /// Input containing `@` is treated as an email; input starting with `0x`
    /// is treated as a wallet address.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_identifier(raw);
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("identifier"));
        }
        if normalized.contains('@') {
            return Email::try_new(&normalized).map(UserIdentifier::Email);
        }
        if normalized.starts_with("0x") {
            return WalletAddress::try_new(&normalized).map(UserIdentifier::Wallet);
        }
        Err(ValidationError::invalid_format(
            "identifier",
            "expected a 0x wallet address or an email",
        ))
    }

    /// Returns the normalized identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            UserIdentifier::Wallet(w) => w.as_str(),
            UserIdentifier::Email(e) => e.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UserIdentifier::Wallet(_) => "wallet",
            UserIdentifier::Email(_) => "email",
        }
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<WalletAddress> for UserIdentifier {
    fn from(value: WalletAddress) -> Self {
        UserIdentifier::Wallet(value)
    }
}

impl From<Email> for UserIdentifier {
    fn from(value: Email) -> Self {
        UserIdentifier::Email(value)
    }
}
