//! Axum router configuration for checkout, webhook and membership endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_checkout, handle_stripe_webhook, list_user_memberships, AppState};

/// Stripe-facing routes.
///
/// # Routes
/// - `POST /webhook` - Signed event delivery (no auth, signature verified)
/// - `POST /checkout` - Start a hosted checkout
pub fn stripe_routes() -> Router<AppState> {
    Router::new()
        .route("/webhook", post(handle_stripe_webhook))
        .route("/checkout", post(create_checkout))
}

/// User query routes.
///
/// # Routes
/// - `GET /:identifier/memberships` - Memberships for a wallet address or email
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/:identifier/memberships", get(list_user_memberships))
}

/// Combined router, mounted under `/api`.
pub fn membership_router() -> Router<AppState> {
    Router::new()
        .nest("/stripe", stripe_routes())
        .nest("/users", user_routes())
}
