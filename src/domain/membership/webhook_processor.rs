//! Webhook dispatch - routes verified events to their handlers.
//!
//! Idempotency is not tracked per event id. Each handler is responsible
//! for being safe under redelivery; the reconciler achieves this through
//! the unique checkout session id on memberships.

use async_trait::async_trait;
use std::sync::Arc;

use super::aggregate::Membership;
use super::stripe_event::{StripeEvent, StripeEventType};
use super::webhook_errors::WebhookError;

/// What a successfully handled delivery did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A membership was inserted for the checkout session.
    MembershipCreated(Membership),
    /// The session already had a membership; nothing was written.
    AlreadyReconciled(Membership),
    /// The event was acknowledged without any state change.
    Acknowledged { reason: String },
}

impl WebhookOutcome {
    /// Membership created or found by this delivery, if any.
    pub fn membership(&self) -> Option<&Membership> {
        match self {
            WebhookOutcome::MembershipCreated(m) | WebhookOutcome::AlreadyReconciled(m) => Some(m),
            WebhookOutcome::Acknowledged { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WebhookOutcome::MembershipCreated(_) => "membership_created",
            WebhookOutcome::AlreadyReconciled(_) => "already_reconciled",
            WebhookOutcome::Acknowledged { .. } => "acknowledged",
        }
    }
}

/// Handler for a specific type of Stripe webhook event.
///
/// Implementations must tolerate receiving the same event more than once,
/// possibly concurrently.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Returns the event type(s) this handler processes.
    fn handles(&self) -> Vec<StripeEventType>;

    /// Handles the webhook event.
    ///
    /// Returns `Err(WebhookError::Ignored(_))` if the event should be
    /// acknowledged but not processed.
    async fn handle(&self, event: &StripeEvent) -> Result<WebhookOutcome, WebhookError>;
}

/// Dispatches webhook events to the appropriate handler.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Find a handler for the given event type.
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler>;

    /// Dispatch an event to its handler.
    ///
    /// Events without a handler, and handler results of
    /// `WebhookError::Ignored`, become [`WebhookOutcome::Acknowledged`].
    async fn dispatch(&self, event: &StripeEvent) -> Result<WebhookOutcome, WebhookError> {
        let event_type = event.parsed_type();
        let result = match self.get_handler(&event_type) {
            Some(handler) => handler.handle(event).await,
            None => Err(WebhookError::Ignored(format!(
                "no handler for event type {}",
                event.event_type
            ))),
        };
        match result {
            Err(WebhookError::Ignored(reason)) => Ok(WebhookOutcome::Acknowledged { reason }),
            other => other,
        }
    }
}

/// Dispatcher backed by a list of registered handlers.
///
/// The first handler claiming an event type wins.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn WebhookEventHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[async_trait]
impl WebhookDispatcher for HandlerRegistry {
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler> {
        self.handlers
            .iter()
            .find(|h| h.handles().contains(event_type))
            .map(|h| h.as_ref())
    }
}
