//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Stripe REST API using
//! form-encoded requests and HTTP basic auth with the secret key.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let gateway = StripePaymentGateway::new(config)?;
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::domain::membership::StripeWebhookVerifier;
use crate::ports::{
    CheckoutSessionHandle, CreateCheckoutRequest, PaymentError, PaymentGateway,
};

use super::api_types::{map_error_response, StripeCheckoutSession};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Default per-request timeout for Stripe API calls.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Reject test-mode events.
    require_livemode: bool,

    /// Timeout applied to every Stripe API request.
    request_timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Builds the webhook verifier for this account's signing secret.
    pub fn webhook_verifier(&self) -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(self.webhook_secret.clone())
            .with_require_livemode(self.require_livemode)
    }
}

impl From<&PaymentConfig> for StripeConfig {
    fn from(config: &PaymentConfig) -> Self {
        StripeConfig::new(&config.stripe_api_key, &config.stripe_webhook_secret)
            .with_base_url(&config.stripe_api_base_url)
            .with_require_livemode(config.require_livemode)
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("require_livemode", &self.require_livemode)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Stripe payment gateway.
pub struct StripePaymentGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentGateway {
    /// Create a new Stripe gateway with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the HTTP client (TLS backend) cannot be built.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Form parameters for `POST /v1/checkout/sessions`.
///
/// Line items use inline `price_data` so no Stripe price objects need to
/// exist ahead of time. Metadata keys are sorted for stable requests.
pub(crate) fn checkout_form_params(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (i, item) in request.items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        params.push((
            format!("{}[price_data][currency]", prefix),
            item.currency.clone(),
        ));
        params.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.unit_amount.to_string(),
        ));
        params.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.name.clone(),
        ));
        params.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
    }

    let mut keys: Vec<&String> = request.metadata.keys().collect();
    keys.sort();
    for key in keys {
        params.push((format!("metadata[{}]", key), request.metadata[key].clone()));
    }

    params
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSessionHandle, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = checkout_form_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Stripe checkout request failed");
                PaymentError::network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = map_error_response(status.as_u16(), &error_text);
            tracing::error!(
                status = status.as_u16(),
                code = %error.code,
                provider_code = ?error.provider_code,
                "Stripe create_checkout_session failed"
            );
            return Err(error);
        }

        let session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        tracing::info!(session_id = %session.id, "Created Stripe checkout session");
        session.into_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{LineItem, PaymentErrorCode};
    use std::collections::HashMap;

    fn request() -> CreateCheckoutRequest {
        let mut metadata = HashMap::new();
        metadata.insert("tier".to_string(), "gold".to_string());
        metadata.insert("level".to_string(), "2".to_string());
        CreateCheckoutRequest {
            items: vec![LineItem {
                name: "Gold membership".to_string(),
                unit_amount: 4900,
                currency: "usd".to_string(),
                quantity: 1,
            }],
            success_url: "https://app.test/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "https://app.test/cancel".to_string(),
            metadata,
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("sk_test_key", "whsec_secret");
        assert_eq!(config.api_base_url(), "https://api.stripe.com");
        assert!(!config.require_livemode);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn config_with_base_url_strips_trailing_slash() {
        let config = StripeConfig::new("key", "secret").with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url(), "http://localhost:12111");
    }

    #[test]
    fn config_from_payment_config() {
        let payment = PaymentConfig {
            stripe_api_key: "sk_test_key".to_string(),
            stripe_webhook_secret: "whsec_secret".to_string(),
            stripe_api_base_url: "http://localhost:12111/".to_string(),
            require_livemode: true,
            ..Default::default()
        };
        let config = StripeConfig::from(&payment);
        assert_eq!(config.api_base_url(), "http://localhost:12111");
        assert!(config.require_livemode);
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let config = StripeConfig::new("sk_test_visible", "whsec_visible");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk_test_visible"));
        assert!(!debug.contains("whsec_visible"));
    }

    #[test]
    fn webhook_verifier_uses_webhook_secret() {
        let config = StripeConfig::new("sk_test_key", "whsec_secret");
        let verifier = config.webhook_verifier();
        let payload = br#"{"id":"evt_1","type":"ping","created":0,"data":{"object":{}}}"#;
        let ts = chrono::Utc::now().timestamp();
        let header = verifier.sign(ts, payload).unwrap();
        assert!(verifier.verify(payload, &header).is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Request Encoding Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn form_params_use_payment_mode_and_inline_prices() {
        let params = checkout_form_params(&request());

        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(
            param(&params, "line_items[0][price_data][currency]"),
            Some("usd")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][unit_amount]"),
            Some("4900")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][name]"),
            Some("Gold membership")
        );
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("1"));
    }

    #[test]
    fn form_params_carry_redirects_and_metadata() {
        let params = checkout_form_params(&request());

        assert_eq!(
            param(&params, "success_url"),
            Some("https://app.test/success?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(param(&params, "cancel_url"), Some("https://app.test/cancel"));
        assert_eq!(param(&params, "metadata[tier]"), Some("gold"));
        assert_eq!(param(&params, "metadata[level]"), Some("2"));
    }

    #[test]
    fn form_params_metadata_is_sorted() {
        let params = checkout_form_params(&request());
        let metadata_keys: Vec<&str> = params
            .iter()
            .filter(|(k, _)| k.starts_with("metadata["))
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(metadata_keys, vec!["metadata[level]", "metadata[tier]"]);
    }

    #[tokio::test]
    async fn unreachable_api_is_network_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let config = StripeConfig::new("sk_test_key", "whsec_secret")
            .with_base_url("http://127.0.0.1:9");
        let gateway = StripePaymentGateway::new(config).unwrap();

        let err = gateway.create_checkout_session(request()).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::NetworkError);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn silent_api_times_out_as_network_error() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = StripeConfig::new("sk_test_key", "whsec_secret")
            .with_base_url(format!("http://{}", addr))
            .with_request_timeout(Duration::from_millis(200));
        let gateway = StripePaymentGateway::new(config).unwrap();

        let started = std::time::Instant::now();
        let err = gateway.create_checkout_session(request()).await.unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::NetworkError);
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
