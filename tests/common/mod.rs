//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;

use tierpass::adapters::http::AppState;
use tierpass::adapters::memory::{InMemoryMembershipRepository, InMemoryUserDirectory};
use tierpass::adapters::stripe::{MockPaymentGateway, StripeConfig};
use tierpass::domain::membership::StripeWebhookVerifier;
use tierpass::domain::user::{Email, User, WalletAddress};

pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";
pub const WALLET: &str = "0xabcdef0123456789abcdef0123456789abcdef01";
pub const EMAIL: &str = "member@example.com";
pub const UNKNOWN_WALLET: &str = "0x0000000000000000000000000000000000000bad";

pub fn verifier() -> StripeWebhookVerifier {
    StripeConfig::new("sk_test_integration", WEBHOOK_SECRET).webhook_verifier()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// `Stripe-Signature` header for `payload` signed at `timestamp`.
pub fn sign_at(payload: &[u8], timestamp: i64) -> String {
    verifier().sign(timestamp, payload).unwrap()
}

pub fn sign(payload: &[u8]) -> String {
    sign_at(payload, now())
}

/// Raw body of a `checkout.session.completed` event.
pub fn completed_event(event_id: &str, session_id: &str, wallet: &str) -> Vec<u8> {
    event_body(event_id, "checkout.session.completed", session_id, wallet, "paid")
}

pub fn event_body(
    event_id: &str,
    event_type: &str,
    session_id: &str,
    wallet: &str,
    payment_status: &str,
) -> Vec<u8> {
    json!({
        "id": event_id,
        "type": event_type,
        "created": now(),
        "livemode": false,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "amount_total": 2500,
                "currency": "usd",
                "payment_status": payment_status,
                "metadata": {
                    "tier": "pro",
                    "level": "2",
                    "walletAddress": wallet
                }
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// In-memory wiring with one registered user.
pub struct Harness {
    pub memberships: InMemoryMembershipRepository,
    pub users: InMemoryUserDirectory,
    pub gateway: MockPaymentGateway,
    pub user: User,
    pub state: AppState,
}

pub async fn harness() -> Harness {
    harness_with_gateway(MockPaymentGateway::new()).await
}

pub async fn harness_with_gateway(gateway: MockPaymentGateway) -> Harness {
    let memberships = InMemoryMembershipRepository::new();
    let users = InMemoryUserDirectory::new();
    let user = User::new(
        Some(Email::try_new(EMAIL).unwrap()),
        Some(WalletAddress::try_new(WALLET).unwrap()),
    )
    .unwrap();
    users.add(user.clone()).await.unwrap();

    let state = AppState::new(
        Arc::new(gateway.clone()),
        Arc::new(memberships.clone()),
        Arc::new(users.clone()),
        verifier(),
        "https://app.tierpass.test",
    );

    Harness {
        memberships,
        users,
        gateway,
        user,
        state,
    }
}
