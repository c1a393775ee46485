//! Integration tests for the HTTP surface.
//!
//! Requests go through the full router, middleware included, via
//! `tower::ServiceExt::oneshot`.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tierpass::adapters::http::app_router;
use tierpass::adapters::stripe::MockPaymentGateway;
use tierpass::config::ServerConfig;
use tierpass::ports::PaymentError;

use common::*;

fn router(h: &Harness) -> Router {
    app_router(h.state.clone(), &ServerConfig::default())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn webhook_request(payload: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    builder.body(Body::from(payload)).unwrap()
}

fn checkout_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/stripe/checkout")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn checkout_body() -> Value {
    json!({
        "items": [
            {"name": "Pro membership", "unitAmount": 2000, "currency": "USD", "quantity": 1},
            {"name": "Setup", "unitAmount": 500, "currency": "usd"}
        ],
        "tier": "pro",
        "level": "2",
        "walletAddress": WALLET.to_uppercase().replacen("0X", "0x", 1)
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn signed_completion_returns_200_and_creates_membership() {
    let h = harness().await;
    let payload = completed_event("evt_http_1", "cs_http_1", WALLET);
    let signature = sign(&payload);

    let (status, body) = send(router(&h), webhook_request(payload, Some(signature))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(body["eventId"], "evt_http_1");
    assert_eq!(body["outcome"], "membership_created");
    assert_eq!(h.memberships.count().await, 1);
}

#[tokio::test]
async fn redelivery_returns_200_without_new_row() {
    let h = harness().await;
    let payload = completed_event("evt_http_2", "cs_http_2", WALLET);

    let first = webhook_request(payload.clone(), Some(sign(&payload)));
    let second = webhook_request(payload.clone(), Some(sign(&payload)));
    send(router(&h), first).await;
    let (status, body) = send(router(&h), second).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_reconciled");
    assert_eq!(h.memberships.count().await, 1);
}

#[tokio::test]
async fn missing_signature_header_returns_400() {
    let h = harness().await;
    let payload = completed_event("evt_http_3", "cs_http_3", WALLET);

    let (status, body) = send(router(&h), webhook_request(payload, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PARSE_ERROR");
    assert_eq!(h.memberships.count().await, 0);
}

#[tokio::test]
async fn malformed_signature_header_returns_400() {
    let h = harness().await;
    let payload = completed_event("evt_http_4", "cs_http_4", WALLET);

    let (status, _) = send(
        router(&h),
        webhook_request(payload, Some("garbage".to_string())),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tampered_body_returns_401() {
    let h = harness().await;
    let payload = completed_event("evt_http_5", "cs_http_5", WALLET);
    let signature = sign(&payload);
    let mut tampered = payload.clone();
    tampered.push(b' ');

    let (status, body) = send(router(&h), webhook_request(tampered, Some(signature))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "SIGNATURE_INVALID");
    assert_eq!(h.memberships.count().await, 0);
}

#[tokio::test]
async fn stale_signature_returns_401() {
    let h = harness().await;
    let payload = completed_event("evt_http_6", "cs_http_6", WALLET);
    let signature = sign_at(&payload, now() - 3600);

    let (status, body) = send(router(&h), webhook_request(payload, Some(signature))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TIMESTAMP_OUT_OF_RANGE");
}

#[tokio::test]
async fn unknown_user_returns_500_so_stripe_redelivers() {
    let h = harness().await;
    let payload = completed_event("evt_http_7", "cs_http_7", UNKNOWN_WALLET);
    let signature = sign(&payload);

    let (status, body) = send(router(&h), webhook_request(payload, Some(signature))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "USER_NOT_FOUND");
    assert_eq!(body["message"], "Internal error");
    assert_eq!(h.memberships.count().await, 0);
}

#[tokio::test]
async fn persistence_failure_returns_500() {
    let h = harness().await;
    h.memberships.fail_writes(true);
    let payload = completed_event("evt_http_8", "cs_http_8", WALLET);
    let signature = sign(&payload);

    let (status, body) = send(router(&h), webhook_request(payload, Some(signature))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "PERSISTENCE_ERROR");
}

#[tokio::test]
async fn ignored_event_type_returns_200() {
    let h = harness().await;
    let payload = event_body("evt_http_9", "customer.created", "cus_1", WALLET, "paid");
    let signature = sign(&payload);

    let (status, body) = send(router(&h), webhook_request(payload, Some(signature))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "acknowledged");
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn checkout_returns_201_with_session() {
    let h = harness().await;

    let (status, body) = send(router(&h), checkout_request(checkout_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sessionId"], "cs_test_1");
    assert_eq!(body["url"], "https://checkout.stripe.com/c/pay/cs_test_1");
    assert_eq!(body["amountTotal"], 2500);
    assert_eq!(body["currency"], "usd");

    let calls = h.gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].metadata.get("walletAddress").map(String::as_str), Some(WALLET));
    assert_eq!(calls[0].metadata.get("tier").map(String::as_str), Some("pro"));
    assert!(calls[0].success_url.starts_with("https://app.tierpass.test/"));
}

#[tokio::test]
async fn checkout_with_no_items_returns_400() {
    let h = harness().await;
    let mut body = checkout_body();
    body["items"] = json!([]);

    let (status, response) = send(router(&h), checkout_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_FAILED");
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn checkout_with_bad_wallet_returns_400() {
    let h = harness().await;
    let mut body = checkout_body();
    body["walletAddress"] = json!("0x123");

    let (status, _) = send(router(&h), checkout_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn checkout_with_missing_field_returns_400() {
    let h = harness().await;

    let (status, response) = send(
        router(&h),
        checkout_request(json!({"items": [], "tier": "pro"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn checkout_provider_failure_returns_502() {
    let gateway = MockPaymentGateway::failing_with(
        PaymentError::invalid_request("No such price").with_provider_code("resource_missing"),
    );
    let h = harness_with_gateway(gateway).await;

    let (status, body) = send(router(&h), checkout_request(checkout_body())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "PAYMENT_PROVIDER_ERROR");
}

// ════════════════════════════════════════════════════════════════════════════════
// Queries
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn user_memberships_lists_reconciled_checkout() {
    let h = harness().await;
    let payload = completed_event("evt_http_10", "cs_http_10", WALLET);
    let signature = sign(&payload);
    send(router(&h), webhook_request(payload, Some(signature))).await;

    let request = Request::builder()
        .uri("/api/users/MEMBER@example.com/memberships")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(&h), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], h.user.id().to_string());
    assert_eq!(body["walletAddress"], WALLET);
    assert_eq!(body["memberships"][0]["stripeSessionId"], "cs_http_10");
    assert_eq!(body["memberships"][0]["tier"], "pro");
}

#[tokio::test]
async fn user_memberships_for_unknown_user_returns_404() {
    let h = harness().await;

    let request = Request::builder()
        .uri(format!("/api/users/{}/memberships", UNKNOWN_WALLET))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(&h), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn health_returns_ok() {
    let h = harness().await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router(&h).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}
