//! Stripe webhook event types.
//!
//! Only fields relevant to reconciliation are captured; the rest of
//! Stripe's event schema is ignored.

use serde::{Deserialize, Serialize};

/// Stripe webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_type_str(&self.event_type)
    }

    /// Best-effort id of the object the event is about, for log context.
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }
}

/// Stripe event types relevant to checkout reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripeEventType {
    /// Customer finished checkout. Payment may still be pending for
    /// delayed methods (`payment_status = unpaid`).
    CheckoutSessionCompleted,
    /// Delayed payment for a completed checkout succeeded.
    CheckoutSessionAsyncPaymentSucceeded,
    /// Delayed payment for a completed checkout failed.
    CheckoutSessionAsyncPaymentFailed,
    /// Checkout session expired without completion.
    CheckoutSessionExpired,
    /// Unknown or unhandled event type.
    Unknown,
}

impl StripeEventType {
    /// Parse event type from string.
    pub fn from_type_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.async_payment_succeeded" => {
                Self::CheckoutSessionAsyncPaymentSucceeded
            }
            "checkout.session.async_payment_failed" => Self::CheckoutSessionAsyncPaymentFailed,
            "checkout.session.expired" => Self::CheckoutSessionExpired,
            _ => Self::Unknown,
        }
    }

    /// Convert to the Stripe event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CheckoutSessionAsyncPaymentSucceeded => {
                "checkout.session.async_payment_succeeded"
            }
            Self::CheckoutSessionAsyncPaymentFailed => "checkout.session.async_payment_failed",
            Self::CheckoutSessionExpired => "checkout.session.expired",
            Self::Unknown => "unknown",
        }
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: self.livemode,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_minimal_event() {
        let raw = json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": { "object": { "id": "cs_test_1" } }
        });

        let event: StripeEvent = serde_json::from_value(raw).unwrap();

        assert_eq!(event.id, "evt_1");
        assert!(!event.livemode);
        assert!(event.api_version.is_none());
        assert_eq!(event.object_id(), Some("cs_test_1"));
    }

    #[test]
    fn deserialize_rejects_missing_type() {
        let raw = json!({
            "id": "evt_1",
            "created": 1,
            "data": { "object": {} }
        });
        assert!(serde_json::from_value::<StripeEvent>(raw).is_err());
    }

    #[test]
    fn deserialize_object_to_custom_type() {
        #[derive(Deserialize)]
        struct Session {
            id: String,
            amount_total: i64,
        }

        let event = StripeEventBuilder::new()
            .object(json!({ "id": "cs_1", "amount_total": 4900 }))
            .build();

        let session: Session = event.deserialize_object().unwrap();
        assert_eq!(session.id, "cs_1");
        assert_eq!(session.amount_total, 4900);
    }

    #[test]
    fn event_type_parsing_covers_checkout_events() {
        for ty in [
            StripeEventType::CheckoutSessionCompleted,
            StripeEventType::CheckoutSessionAsyncPaymentSucceeded,
            StripeEventType::CheckoutSessionAsyncPaymentFailed,
            StripeEventType::CheckoutSessionExpired,
        ] {
            assert_eq!(StripeEventType::from_type_str(ty.as_str()), ty);
        }
        assert_eq!(
            StripeEventType::from_type_str("invoice.paid"),
            StripeEventType::Unknown
        );
    }

    #[test]
    fn parsed_type_uses_event_type_field() {
        let event = StripeEventBuilder::new()
            .event_type("checkout.session.expired")
            .build();
        assert_eq!(event.parsed_type(), StripeEventType::CheckoutSessionExpired);
    }
}
