//! Payment configuration

use serde::Deserialize;
use std::fmt;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key (sk_...)
    pub stripe_api_key: String,

    /// Stripe webhook signing secret (whsec_...)
    pub stripe_webhook_secret: String,

    /// Stripe REST endpoint; overridden for stripe-mock in tests
    #[serde(default = "default_stripe_api_base_url")]
    pub stripe_api_base_url: String,

    /// Public front-end origin used for checkout redirects
    #[serde(default = "default_checkout_base_url")]
    pub checkout_base_url: String,

    /// Reject test-mode webhook events
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    ///
    /// Live keys additionally require an HTTPS checkout origin.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired(
                "TIERPASS__PAYMENT__STRIPE_API_KEY",
            ));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "TIERPASS__PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        for (name, url) in [
            ("stripe_api_base_url", &self.stripe_api_base_url),
            ("checkout_base_url", &self.checkout_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl(name));
            }
        }
        if self.is_live_mode() && !self.checkout_base_url.starts_with("https://") {
            return Err(ValidationError::UrlMustBeHttps("checkout_base_url"));
        }

        Ok(())
    }
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("stripe_api_key", &"[REDACTED]")
            .field("stripe_webhook_secret", &"[REDACTED]")
            .field("stripe_api_base_url", &self.stripe_api_base_url)
            .field("checkout_base_url", &self.checkout_base_url)
            .field("require_livemode", &self.require_livemode)
            .finish()
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_api_base_url: default_stripe_api_base_url(),
            checkout_base_url: default_checkout_base_url(),
            require_livemode: false,
        }
    }
}

fn default_stripe_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_checkout_base_url() -> String {
    "http://localhost:3000".to_string()
}
