//! Checkout session metadata and the completed-checkout view.
//!
//! Metadata is written when the checkout session is created and read back
//! from the verified webhook. The keys are part of the wire contract with
//! Stripe and must not change.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::user::WalletAddress;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;
use super::{MembershipLevel, MembershipTier};

pub const METADATA_TIER: &str = "tier";
pub const METADATA_LEVEL: &str = "level";
pub const METADATA_WALLET_ADDRESS: &str = "walletAddress";

/// What the buyer is purchasing and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub tier: MembershipTier,
    pub level: MembershipLevel,
    pub wallet_address: WalletAddress,
}

impl CheckoutMetadata {
    /// Renders the metadata map attached to the provider session.
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            (METADATA_TIER.to_string(), self.tier.to_string()),
            (METADATA_LEVEL.to_string(), self.level.to_string()),
            (
                METADATA_WALLET_ADDRESS.to_string(),
                self.wallet_address.to_string(),
            ),
        ])
    }

    /// Reads metadata back from a provider session.
    ///
    /// # Errors
    ///
    /// - `MissingMetadata` if a key is absent
    /// - `InvalidMetadata` if a value fails validation
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, WebhookError> {
        let tier = required(map, METADATA_TIER)?;
        let level = required(map, METADATA_LEVEL)?;
        let wallet = required(map, METADATA_WALLET_ADDRESS)?;

        Ok(Self {
            tier: MembershipTier::try_new(tier).map_err(|e| invalid(METADATA_TIER, e))?,
            level: MembershipLevel::try_new(level).map_err(|e| invalid(METADATA_LEVEL, e))?,
            wallet_address: WalletAddress::try_new(wallet)
                .map_err(|e| invalid(METADATA_WALLET_ADDRESS, e))?,
        })
    }
}

fn required<'a>(
    map: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, WebhookError> {
    map.get(key)
        .map(String::as_str)
        .ok_or(WebhookError::MissingMetadata(key))
}

fn invalid(field: &'static str, err: impl std::fmt::Display) -> WebhookError {
    WebhookError::InvalidMetadata {
        field,
        reason: err.to_string(),
    }
}

/// Payment status reported on a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Returns true once funds are captured (or none are due).
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::NoPaymentRequired)
    }
}

/// The checkout session object embedded in `checkout.session.*` events.
#[derive(Debug, Clone, Deserialize)]
struct CheckoutSessionObject {
    id: String,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    payment_status: Option<PaymentStatus>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// A checkout session extracted from a verified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub session_id: String,
    pub metadata: CheckoutMetadata,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

impl CompletedCheckout {
    /// Extracts the checkout session from a verified event.
    ///
    /// # Errors
    ///
    /// - `ParseError` if the event object is not a checkout session or has
    ///   an empty id
    /// - metadata errors from [`CheckoutMetadata::from_map`]
    pub fn from_event(event: &StripeEvent) -> Result<Self, WebhookError> {
        let session: CheckoutSessionObject = event
            .deserialize_object()
            .map_err(|e| WebhookError::ParseError(format!("checkout session: {}", e)))?;

        if session.id.trim().is_empty() {
            return Err(WebhookError::ParseError(
                "checkout session id is empty".to_string(),
            ));
        }

        let metadata = CheckoutMetadata::from_map(&session.metadata)?;

        Ok(Self {
            session_id: session.id,
            metadata,
            amount_total: session.amount_total,
            currency: session.currency.map(|c| c.to_lowercase()),
            payment_status: session.payment_status,
        })
    }

    /// Returns true if the membership can be granted now.
    ///
    /// A session without a reported payment status is treated as paid.
    pub fn is_paid(&self) -> bool {
        self.payment_status.map_or(true, |s| s.is_settled())
    }
}
