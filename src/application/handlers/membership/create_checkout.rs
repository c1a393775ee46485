//! CreateCheckoutHandler - Command handler for starting a paid checkout.

use std::sync::Arc;

use crate::domain::membership::{
    CheckoutMetadata, MembershipError, MembershipLevel, MembershipTier,
};
use crate::domain::user::WalletAddress;
use crate::ports::{CheckoutSessionHandle, CreateCheckoutRequest, LineItem, PaymentGateway};

/// Stripe substitutes the real session id into this placeholder.
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Command to create a checkout session for a membership purchase.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub items: Vec<LineItem>,
    pub tier: String,
    pub level: String,
    /// Payer wallet; normalized before it is attached to the session.
    pub wallet_address: String,
}

/// Result of successful checkout creation.
#[derive(Debug, Clone)]
pub struct CreateCheckoutResult {
    pub session: CheckoutSessionHandle,
}

/// Handler for creating checkout sessions.
///
/// Validates the purchase locally, then asks the payment gateway for a
/// hosted session carrying tier, level and wallet metadata. Nothing is
/// persisted here; the membership is created when the completion webhook
/// arrives.
pub struct CreateCheckoutHandler {
    gateway: Arc<dyn PaymentGateway>,
    public_base_url: String,
}

impl CreateCheckoutHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, public_base_url: impl Into<String>) -> Self {
        Self {
            gateway,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        format!(
            "{}/success?session_id={}",
            self.public_base_url, SESSION_ID_PLACEHOLDER
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.public_base_url)
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutCommand,
    ) -> Result<CreateCheckoutResult, MembershipError> {
        // 1. Validate purchase
        let items = validate_items(cmd.items)?;
        let metadata = CheckoutMetadata {
            tier: MembershipTier::try_new(&cmd.tier)?,
            level: MembershipLevel::try_new(&cmd.level)?,
            wallet_address: WalletAddress::try_new(&cmd.wallet_address)?,
        };

        // 2. Create session at the provider
        let request = CreateCheckoutRequest {
            items,
            success_url: self.success_url(),
            cancel_url: self.cancel_url(),
            metadata: metadata.to_map(),
        };

        let session = self
            .gateway
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    code = %e.code,
                    provider_code = ?e.provider_code,
                    retryable = e.retryable,
                    error = %e.message,
                    "Checkout session creation failed"
                );
                MembershipError::payment_provider(
                    e.provider_code.clone().unwrap_or_else(|| e.code.to_string()),
                    e.message,
                )
            })?;

        tracing::info!(
            session_id = %session.id,
            tier = %metadata.tier,
            level = %metadata.level,
            "Checkout session created"
        );

        Ok(CreateCheckoutResult { session })
    }
}

/// Checks line items and normalizes their currency to lowercase.
fn validate_items(items: Vec<LineItem>) -> Result<Vec<LineItem>, MembershipError> {
    if items.is_empty() {
        return Err(MembershipError::validation(
            "items",
            "at least one line item is required",
        ));
    }

    let mut normalized = Vec::with_capacity(items.len());
    for mut item in items {
        if item.name.trim().is_empty() {
            return Err(MembershipError::validation("items.name", "cannot be empty"));
        }
        if item.unit_amount <= 0 {
            return Err(MembershipError::validation(
                "items.unit_amount",
                "must be a positive amount in minor units",
            ));
        }
        if item.quantity == 0 {
            return Err(MembershipError::validation(
                "items.quantity",
                "must be at least 1",
            ));
        }
        if item.total().is_none() {
            return Err(MembershipError::validation("items", "amount overflows"));
        }
        item.currency = item.currency.trim().to_lowercase();
        if item.currency.len() != 3 || !item.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MembershipError::validation(
                "items.currency",
                "must be a 3-letter ISO currency code",
            ));
        }
        normalized.push(item);
    }

    if normalized.iter().any(|i| i.currency != normalized[0].currency) {
        return Err(MembershipError::validation(
            "items.currency",
            "all items must share one currency",
        ));
    }

    Ok(normalized)
}
