//! HTTP handlers for checkout, webhook and membership endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::membership::{
    CreateCheckoutCommand, CreateCheckoutHandler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, ListMembershipsHandler, ListMembershipsQuery,
    MembershipReconciler,
};
use crate::domain::membership::{
    HandlerRegistry, MembershipError, StripeWebhookVerifier, WebhookDispatcher, WebhookError,
};
use crate::ports::{MembershipRepository, PaymentGateway, UserDirectory};

use super::dto::{
    CheckoutResponse, ErrorResponse, StartCheckoutRequest, UserMembershipsResponse,
    WebhookAckResponse,
};

/// Header carrying the Stripe webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub membership_repository: Arc<dyn MembershipRepository>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub webhook_verifier: StripeWebhookVerifier,
    pub webhook_dispatcher: Arc<dyn WebhookDispatcher>,
    /// Front-end origin for checkout redirects.
    pub checkout_base_url: String,
}

impl AppState {
    /// Wires the membership reconciler as the webhook handler.
    pub fn new(
        payment_gateway: Arc<dyn PaymentGateway>,
        membership_repository: Arc<dyn MembershipRepository>,
        user_directory: Arc<dyn UserDirectory>,
        webhook_verifier: StripeWebhookVerifier,
        checkout_base_url: impl Into<String>,
    ) -> Self {
        let reconciler =
            MembershipReconciler::new(membership_repository.clone(), user_directory.clone());
        let dispatcher = HandlerRegistry::new().register(Arc::new(reconciler));

        Self {
            payment_gateway,
            membership_repository,
            user_directory,
            webhook_verifier,
            webhook_dispatcher: Arc::new(dispatcher),
            checkout_base_url: checkout_base_url.into(),
        }
    }

    /// Create handlers on demand from the shared state.
    pub fn checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(self.payment_gateway.clone(), self.checkout_base_url.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.webhook_dispatcher.clone(),
        )
    }

    pub fn list_memberships_handler(&self) -> ListMembershipsHandler {
        ListMembershipsHandler::new(
            self.user_directory.clone(),
            self.membership_repository.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/stripe/webhook - Verify and reconcile a Stripe event
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Webhook delivery without Stripe-Signature header");
            WebhookError::ParseError("missing Stripe-Signature header".to_string())
        })?;

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    let result = handler.handle(cmd).await?;

    Ok((StatusCode::OK, Json(WebhookAckResponse::from(result))))
}

/// POST /api/stripe/checkout - Start a hosted checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<StartCheckoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, MembershipApiError> {
    let Json(request) =
        payload.map_err(|rejection| MembershipError::validation("body", rejection.body_text()))?;

    let handler = state.checkout_handler();
    let result = handler.handle(CreateCheckoutCommand::from(request)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse::from(result.session)),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// User Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/users/:identifier/memberships - Memberships for a wallet or email
pub async fn list_user_memberships(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<impl IntoResponse, MembershipApiError> {
    let handler = state.list_memberships_handler();
    let result = handler.handle(ListMembershipsQuery { identifier }).await?;

    Ok(Json(UserMembershipsResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts membership errors to HTTP responses.
#[derive(Debug)]
pub struct MembershipApiError(MembershipError);

impl From<MembershipError> for MembershipApiError {
    fn from(err: MembershipError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MembershipApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            MembershipError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            MembershipError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            MembershipError::PaymentProvider { .. } => {
                (StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_ERROR")
            }
            MembershipError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = ErrorResponse::new(code, self.0.message());
        (status, Json(body)).into_response()
    }
}

/// API error type for webhook deliveries.
///
/// The status code decides whether Stripe redelivers.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = if status.is_server_error() {
            "Internal error".to_string()
        } else {
            self.0.to_string()
        };
        let body = ErrorResponse::new(self.0.code(), message);
        (status, Json(body)).into_response()
    }
}
