//! Membership-specific error types.
//!
//! Errors raised by checkout creation, membership queries and admin
//! promotion. Webhook delivery failures use [`WebhookError`] instead.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | UserNotFound | 404 |
//! | PaymentProvider | 502 |
//! | Infrastructure | 500 |
//!
//! [`WebhookError`]: super::WebhookError

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Membership-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// Input failed validation.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// No user matches the identifier.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Payment provider rejected or failed the request. Not retried.
    #[error("Payment provider error ({code}): {message}")]
    PaymentProvider { code: String, message: String },

    /// Store or other infrastructure failure.
    #[error("Persistence error: {0}")]
    Infrastructure(String),
}

impl MembershipError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MembershipError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        MembershipError::UserNotFound(identifier.into())
    }

    pub fn payment_provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        MembershipError::PaymentProvider {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        MembershipError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MembershipError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            MembershipError::UserNotFound(_) => ErrorCode::UserNotFound,
            MembershipError::PaymentProvider { .. } => ErrorCode::PaymentProviderError,
            MembershipError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing message.
    ///
    /// Infrastructure details are withheld.
    pub fn message(&self) -> String {
        match self {
            MembershipError::Infrastructure(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for MembershipError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        MembershipError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for MembershipError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => MembershipError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            ErrorCode::UserNotFound => MembershipError::UserNotFound(err.message),
            ErrorCode::PaymentProviderError => MembershipError::PaymentProvider {
                code: err.details.get("provider_code").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => MembershipError::Infrastructure(err.to_string()),
        }
    }
}

impl From<MembershipError> for DomainError {
    fn from(err: MembershipError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field() {
        let err: MembershipError = ValidationError::empty_field("tier").into();
        assert_eq!(
            err,
            MembershipError::ValidationFailed {
                field: "tier".to_string(),
                message: "Field 'tier' cannot be empty".to_string(),
            }
        );
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[test]
    fn database_domain_error_becomes_infrastructure() {
        let err: MembershipError =
            DomainError::new(ErrorCode::DatabaseError, "connection refused").into();
        assert!(matches!(err, MembershipError::Infrastructure(_)));
        assert_eq!(err.message(), "Internal error");
    }

    #[test]
    fn user_not_found_domain_error_maps_back() {
        let err: MembershipError = DomainError::new(ErrorCode::UserNotFound, "0xabc").into();
        assert_eq!(err, MembershipError::UserNotFound("0xabc".to_string()));
    }

    #[test]
    fn payment_provider_display_includes_code() {
        let err = MembershipError::payment_provider("card_declined", "Your card was declined");
        assert_eq!(
            err.to_string(),
            "Payment provider error (card_declined): Your card was declined"
        );
        assert_eq!(err.code(), ErrorCode::PaymentProviderError);
    }

    #[test]
    fn converts_into_domain_error() {
        let domain: DomainError = MembershipError::user_not_found("a@b.co").into();
        assert_eq!(domain.code, ErrorCode::UserNotFound);
    }
}
