//! HandlePaymentWebhookHandler - Command handler for processing payment provider webhooks.

use std::sync::Arc;

use crate::domain::membership::{
    StripeWebhookVerifier, WebhookDispatcher, WebhookError, WebhookOutcome,
};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, exactly as received.
    pub payload: Vec<u8>,
    /// Webhook signature header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlePaymentWebhookResult {
    pub event_id: String,
    pub event_type: String,
    pub outcome: WebhookOutcome,
}

/// Handler for processing payment provider webhooks.
///
/// Verifies the signature over the raw payload, then dispatches the parsed
/// event. Nothing in the payload is read before verification succeeds.
pub struct HandlePaymentWebhookHandler {
    verifier: StripeWebhookVerifier,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(verifier: StripeWebhookVerifier, dispatcher: Arc<dyn WebhookDispatcher>) -> Self {
        Self {
            verifier,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Verify webhook signature and parse event
        let event = self
            .verifier
            .verify(&cmd.payload, &cmd.signature)
            .map_err(|e| {
                if e.is_authentication_failure() {
                    tracing::warn!(
                        error_code = e.code(),
                        payload_len = cmd.payload.len(),
                        "Webhook signature rejected"
                    );
                } else {
                    tracing::info!(
                        error_code = e.code(),
                        payload_len = cmd.payload.len(),
                        error = %e,
                        "Malformed webhook delivery"
                    );
                }
                e
            })?;

        // 2. Dispatch to the handler for this event type
        let outcome = self.dispatcher.dispatch(&event).await.map_err(|e| {
            let session_id = event.object_id().unwrap_or("unknown");
            if e.status_code().is_server_error() {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    session_id,
                    error_code = e.code(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Webhook processing failed"
                );
            } else {
                tracing::warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    session_id,
                    error_code = e.code(),
                    error = %e,
                    "Webhook event rejected"
                );
            }
            e
        })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            session_id = event.object_id().unwrap_or("unknown"),
            outcome = outcome.label(),
            "Webhook processed"
        );

        Ok(HandlePaymentWebhookResult {
            event_id: event.id,
            event_type: event.event_type,
            outcome,
        })
    }
}
