//! Webhook error types for Stripe webhook handling.
//!
//! Defines all error conditions that can occur while verifying and
//! reconciling a webhook delivery, with HTTP status mapping. The status
//! code drives Stripe's redelivery: 2xx acknowledges, 4xx drops,
//! 5xx redelivers.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the replay window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signature timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header or the verified payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Test-mode event delivered to a live-mode endpoint.
    #[error("Livemode mismatch")]
    LivemodeMismatch,

    /// Required metadata field missing from the checkout session.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Metadata field present but not valid.
    #[error("Invalid metadata '{field}': {reason}")]
    InvalidMetadata { field: &'static str, reason: String },

    /// No local user matches the payer's wallet address.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Attempted reconciliation state transition is not valid.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Membership store failed for a reason other than the idempotency
    /// duplicate.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl WebhookError {
    /// Returns true if the failure may succeed on redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Persistence(_) | WebhookError::UserNotFound(_)
        )
    }

    /// Returns true if the delivery was rejected before its payload was
    /// trusted.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failures - don't retry
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            // Bad request - don't retry
            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::LivemodeMismatch
            | WebhookError::MissingMetadata(_)
            | WebhookError::InvalidMetadata { .. } => StatusCode::BAD_REQUEST,

            // Ignored events are acknowledged as success
            WebhookError::Ignored(_) => StatusCode::OK,

            // Server errors - Stripe redelivers
            WebhookError::UserNotFound(_)
            | WebhookError::InvalidTransition(_)
            | WebhookError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::InvalidSignature => "SIGNATURE_INVALID",
            WebhookError::TimestampOutOfRange => "TIMESTAMP_OUT_OF_RANGE",
            WebhookError::InvalidTimestamp => "INVALID_TIMESTAMP",
            WebhookError::ParseError(_) => "PARSE_ERROR",
            WebhookError::LivemodeMismatch => "LIVEMODE_MISMATCH",
            WebhookError::MissingMetadata(_) => "MISSING_METADATA",
            WebhookError::InvalidMetadata { .. } => "INVALID_METADATA",
            WebhookError::UserNotFound(_) => "USER_NOT_FOUND",
            WebhookError::InvalidTransition(_) => "INVALID_STATE_TRANSITION",
            WebhookError::Ignored(_) => "IGNORED",
            WebhookError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

/// Repository failures surface as persistence errors.
impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Persistence(err.to_string())
    }
}
