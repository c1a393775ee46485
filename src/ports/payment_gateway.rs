//! Payment gateway port.
//!
//! Creates checkout sessions at the payment provider. The gateway is
//! passed to handlers explicitly; there is no process-wide client.
//!
//! Amounts are integer minor currency units (cents). Provider errors are
//! surfaced as [`PaymentError`] and never retried by callers; the HTTP
//! client owns its own transport retry policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Port for the payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a hosted checkout session and returns its redirect URL.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSessionHandle, PaymentError>;
}

/// One purchasable line on a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name shown on the hosted page.
    pub name: String,
    /// Price per unit in minor currency units.
    pub unit_amount: i64,
    /// Lowercase ISO 4217 code.
    pub currency: String,
    pub quantity: u32,
}

impl LineItem {
    /// Total for this line in minor units, `None` on overflow.
    pub fn total(&self) -> Option<i64> {
        self.unit_amount.checked_mul(i64::from(self.quantity))
    }
}

/// Request to create a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutRequest {
    pub items: Vec<LineItem>,
    /// Redirect after payment. May contain `{CHECKOUT_SESSION_ID}`.
    pub success_url: String,
    /// Redirect when the buyer backs out.
    pub cancel_url: String,
    /// Attached to the session and echoed back in webhooks.
    pub metadata: HashMap<String, String>,
}

/// Provider-side checkout session as returned on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionHandle {
    /// Provider session id (`cs_...`).
    pub id: String,
    /// Hosted checkout page to redirect the buyer to.
    pub url: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Payment provider errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether a later identical request could succeed.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the provider's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an invalid request error (provider-side validation).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create a generic provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let provider_code = err
            .provider_code
            .clone()
            .unwrap_or_else(|| err.code.to_string());
        DomainError::new(ErrorCode::PaymentProviderError, err.message)
            .with_detail("provider_code", provider_code)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API key rejected.
    AuthenticationError,

    /// Provider rejected the request parameters.
    InvalidRequest,

    /// Provider throttled the request.
    RateLimited,

    /// Any other provider-side failure.
    ProviderError,
}

impl PaymentErrorCode {
    /// Returns true if this error type is typically transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimited
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimited => "rate_limited",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
