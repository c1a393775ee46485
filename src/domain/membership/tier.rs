//! Membership tier and level.
//!
//! Both values come from checkout metadata and are treated as opaque
//! labels (e.g. tier `"pro"`, level `"2"`). Catalog semantics live with
//! whoever configures the checkout, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Maximum length of a tier or level label.
const MAX_LABEL_LEN: usize = 64;

fn validate_label(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if trimmed.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::out_of_range(
            field,
            1,
            MAX_LABEL_LEN as i32,
            trimmed.chars().count() as i32,
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::invalid_format(
            field,
            "control characters are not allowed",
        ));
    }
    Ok(trimmed.to_string())
}

/// Purchased membership tier, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MembershipTier(String);

impl MembershipTier {
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        validate_label("tier", raw).map(|t| Self(t.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MembershipTier {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<MembershipTier> for String {
    fn from(value: MembershipTier) -> Self {
        value.0
    }
}

/// Level within a tier, kept as given (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MembershipLevel(String);

impl MembershipLevel {
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        validate_label("level", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MembershipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MembershipLevel {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<MembershipLevel> for String {
    fn from(value: MembershipLevel) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_is_trimmed_and_lowercased() {
        let tier = MembershipTier::try_new("  Pro ").unwrap();
        assert_eq!(tier.as_str(), "pro");
    }

    #[test]
    fn level_keeps_case() {
        let level = MembershipLevel::try_new(" Gold-2 ").unwrap();
        assert_eq!(level.as_str(), "Gold-2");
    }

    #[test]
    fn empty_labels_are_rejected() {
        assert!(matches!(
            MembershipTier::try_new("   "),
            Err(ValidationError::EmptyField { .. })
        ));
        assert!(MembershipLevel::try_new("").is_err());
    }

    #[test]
    fn overlong_labels_are_rejected() {
        let long = "x".repeat(MAX_LABEL_LEN + 1);
        assert!(matches!(
            MembershipTier::try_new(&long),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(MembershipLevel::try_new("2\u{0007}").is_err());
    }

    #[test]
    fn tier_serializes_as_plain_string() {
        let tier = MembershipTier::try_new("pro").unwrap();
        assert_eq!(serde_json::to_string(&tier).unwrap(), "\"pro\"");
    }
}
