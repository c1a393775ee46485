//! Stripe REST API response types.
//!
//! Only the fields the gateway reads are modelled; Stripe adds fields
//! freely, so unknown keys are ignored.

use serde::Deserialize;
use std::collections::HashMap;

use crate::ports::{CheckoutSessionHandle, PaymentError, PaymentErrorCode};

/// `POST /v1/checkout/sessions` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeCheckoutSession {
    /// Converts to the port type.
    ///
    /// Hosted sessions always carry a URL; one without is a provider error.
    pub fn into_handle(self) -> Result<CheckoutSessionHandle, PaymentError> {
        let url = self.url.filter(|u| !u.is_empty()).ok_or_else(|| {
            PaymentError::provider(format!("checkout session {} has no url", self.id))
        })?;
        Ok(CheckoutSessionHandle {
            id: self.id,
            url,
            amount_total: self.amount_total,
            currency: self.currency.map(|c| c.to_lowercase()),
            metadata: self.metadata,
        })
    }
}

/// Error envelope returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Maps a failed Stripe response to a `PaymentError`.
///
/// HTTP status decides auth and rate limiting; the error `type` decides
/// between caller mistakes and provider failures.
pub fn map_error_response(status: u16, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok();
    let (error_type, provider_code, message) = match parsed {
        Some(envelope) => (
            envelope.error.error_type,
            envelope.error.code,
            envelope
                .error
                .message
                .unwrap_or_else(|| format!("Stripe API error ({})", status)),
        ),
        None => (None, None, format!("Stripe API error ({}): {}", status, body)),
    };

    let code = match (status, error_type.as_deref()) {
        (401, _) | (_, Some("authentication_error")) => PaymentErrorCode::AuthenticationError,
        (429, _) | (_, Some("rate_limit_error")) => PaymentErrorCode::RateLimited,
        (_, Some("invalid_request_error")) | (_, Some("card_error")) => {
            PaymentErrorCode::InvalidRequest
        }
        _ => PaymentErrorCode::ProviderError,
    };

    let error = PaymentError::new(code, message);
    match provider_code.or(error_type) {
        Some(pc) => error.with_provider_code(pc),
        None => error,
    }
}
