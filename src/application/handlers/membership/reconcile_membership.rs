//! MembershipReconciler - turns a paid checkout session into a membership.
//!
//! Handles `checkout.session.completed` and
//! `checkout.session.async_payment_succeeded`. Safe under redelivery and
//! concurrent delivery: the session id is the idempotency key and the
//! store's unique insert is the only guard.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::membership::{
    CompletedCheckout, Membership, SessionReconciliation, StripeEvent, StripeEventType,
    WebhookError, WebhookEventHandler, WebhookOutcome,
};
use crate::domain::user::UserIdentifier;
use crate::ports::{InsertResult, MembershipRepository, UserDirectory};

/// Outcome of one reconciliation attempt, with the session's final state.
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub session: SessionReconciliation,
    pub result: Result<WebhookOutcome, WebhookError>,
}

/// Webhook handler that creates memberships for completed checkouts.
pub struct MembershipReconciler {
    memberships: Arc<dyn MembershipRepository>,
    users: Arc<dyn UserDirectory>,
}

impl MembershipReconciler {
    pub fn new(memberships: Arc<dyn MembershipRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { memberships, users }
    }

    /// Reconciles one completed checkout.
    ///
    /// Persistence failures move the session to `Failed` and are returned
    /// without retry; the provider's redelivery is the retry mechanism.
    pub async fn reconcile(
        &self,
        checkout: &CompletedCheckout,
        event_type: StripeEventType,
    ) -> ReconcileReport {
        let mut session = SessionReconciliation::start(&checkout.session_id);
        let result = self.run(checkout, event_type, &mut session).await;

        if let Err(err) = &result {
            // First failure reason wins; fail() is a no-op once Failed.
            let _ = session.fail(err.to_string());
            tracing::error!(
                session_id = %checkout.session_id,
                event_type = event_type.as_str(),
                error_code = err.code(),
                error = %err,
                "Membership reconciliation failed"
            );
        }

        ReconcileReport { session, result }
    }

    async fn run(
        &self,
        checkout: &CompletedCheckout,
        event_type: StripeEventType,
        session: &mut SessionReconciliation,
    ) -> Result<WebhookOutcome, WebhookError> {
        // 1. Resolve payer
        let wallet = checkout.metadata.wallet_address.clone();
        let user = self
            .users
            .find_by_identifier(&UserIdentifier::Wallet(wallet.clone()))
            .await?
            .ok_or_else(|| WebhookError::UserNotFound(wallet.to_string()))?;

        // 2. Redelivery of an already reconciled session is a no-op
        if let Some(existing) = self
            .memberships
            .find_by_session_id(&checkout.session_id)
            .await?
        {
            session.complete()?;
            session.reconcile()?;
            tracing::info!(
                session_id = %checkout.session_id,
                membership_id = %existing.id,
                "Checkout session already reconciled"
            );
            return Ok(WebhookOutcome::AlreadyReconciled(existing));
        }

        session.complete()?;

        // 3. Insert keyed by session id; a lost race returns the winner
        let membership = Membership::from_checkout(user.id(), checkout);
        let outcome = match self.memberships.insert(&membership).await? {
            InsertResult::Inserted => {
                tracing::info!(
                    session_id = %checkout.session_id,
                    membership_id = %membership.id,
                    user_id = %user.id(),
                    tier = %membership.tier,
                    level = %membership.level,
                    event_type = event_type.as_str(),
                    "Membership created"
                );
                WebhookOutcome::MembershipCreated(membership)
            }
            InsertResult::AlreadyExists => {
                let winner = self
                    .memberships
                    .find_by_session_id(&checkout.session_id)
                    .await?
                    .ok_or_else(|| {
                        WebhookError::Persistence(format!(
                            "membership for session {} vanished after duplicate insert",
                            checkout.session_id
                        ))
                    })?;
                tracing::info!(
                    session_id = %checkout.session_id,
                    membership_id = %winner.id,
                    "Concurrent delivery already created membership"
                );
                WebhookOutcome::AlreadyReconciled(winner)
            }
        };

        session.reconcile()?;
        Ok(outcome)
    }
}

#[async_trait]
impl WebhookEventHandler for MembershipReconciler {
    fn handles(&self) -> Vec<StripeEventType> {
        vec![
            StripeEventType::CheckoutSessionCompleted,
            StripeEventType::CheckoutSessionAsyncPaymentSucceeded,
        ]
    }

    async fn handle(&self, event: &StripeEvent) -> Result<WebhookOutcome, WebhookError> {
        let event_type = event.parsed_type();
        let checkout = CompletedCheckout::from_event(event)?;

        if !checkout.is_paid() {
            return Err(WebhookError::Ignored(format!(
                "checkout session {} is not paid yet",
                checkout.session_id
            )));
        }

        self.reconcile(&checkout, event_type).await.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryMembershipRepository, InMemoryUserDirectory};
    use crate::domain::membership::{ReconciliationState, StripeEventBuilder};
    use crate::domain::user::{User, WalletAddress};
    use serde_json::json;

    const WALLET: &str = "0xabc0000000000000000000000000000000000001";

    struct Fixture {
        memberships: InMemoryMembershipRepository,
        reconciler: MembershipReconciler,
    }

    async fn fixture() -> Fixture {
        let memberships = InMemoryMembershipRepository::new();
        let users = InMemoryUserDirectory::new();
        users
            .add(User::new(None, Some(WalletAddress::try_new(WALLET).unwrap())).unwrap())
            .await
            .unwrap();
        let reconciler =
            MembershipReconciler::new(Arc::new(memberships.clone()), Arc::new(users.clone()));
        Fixture {
            memberships,
            reconciler,
        }
    }

    fn completed_event(session_id: &str, wallet: &str, payment_status: &str) -> StripeEvent {
        StripeEventBuilder::new()
            .event_type("checkout.session.completed")
            .object(json!({
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
            }))
            .build()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Creation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_delivery_creates_membership() {
        let f = fixture().await;
        let event = completed_event("cs_test_1", WALLET, "paid");

        let outcome = f.reconciler.handle(&event).await.unwrap();

        let membership = match outcome {
            WebhookOutcome::MembershipCreated(m) => m,
            other => panic!("expected MembershipCreated, got {:?}", other),
        };
        assert_eq!(membership.tier.as_str(), "pro");
        assert_eq!(membership.level.as_str(), "2");
        assert_eq!(membership.stripe_session_id, "cs_test_1");
        assert_eq!(membership.amount_total, Some(2500));
        assert_eq!(f.memberships.count().await, 1);
    }

    #[tokio::test]
    async fn mixed_case_wallet_in_metadata_resolves_user() {
        let f = fixture().await;
        let event = completed_event(
            "cs_test_1",
            "0xABC0000000000000000000000000000000000001",
            "paid",
        );

        assert!(f.reconciler.handle(&event).await.is_ok());
        assert_eq!(f.memberships.count().await, 1);
    }

    #[tokio::test]
    async fn successful_session_ends_reconciled() {
        let f = fixture().await;
        let checkout = CompletedCheckout::from_event(&completed_event("cs_1", WALLET, "paid"))
            .unwrap();

        let report = f
            .reconciler
            .reconcile(&checkout, StripeEventType::CheckoutSessionCompleted)
            .await;

        assert!(report.result.is_ok());
        assert_eq!(report.session.state(), ReconciliationState::Reconciled);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Idempotency Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn redelivery_is_noop_returning_existing() {
        let f = fixture().await;
        let event = completed_event("cs_test_1", WALLET, "paid");

        let first = f.reconciler.handle(&event).await.unwrap();
        let second = f.reconciler.handle(&event).await.unwrap();

        assert_eq!(second.label(), "already_reconciled");
        assert_eq!(
            first.membership().unwrap().id,
            second.membership().unwrap().id
        );
        assert_eq!(f.memberships.count().await, 1);
    }

    #[tokio::test]
    async fn async_success_after_completion_is_noop() {
        let f = fixture().await;
        f.reconciler
            .handle(&completed_event("cs_test_1", WALLET, "paid"))
            .await
            .unwrap();

        let mut async_event = completed_event("cs_test_1", WALLET, "paid");
        async_event.event_type = "checkout.session.async_payment_succeeded".to_string();
        let outcome = f.reconciler.handle(&async_event).await.unwrap();

        assert_eq!(outcome.label(), "already_reconciled");
        assert_eq!(f.memberships.count().await, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_wallet_is_user_not_found_without_row() {
        let f = fixture().await;
        let stranger = "0xdef0000000000000000000000000000000000002";
        let checkout =
            CompletedCheckout::from_event(&completed_event("cs_1", stranger, "paid")).unwrap();

        let report = f
            .reconciler
            .reconcile(&checkout, StripeEventType::CheckoutSessionCompleted)
            .await;

        assert_eq!(
            report.result,
            Err(WebhookError::UserNotFound(stranger.to_string()))
        );
        assert_eq!(report.session.state(), ReconciliationState::Failed);
        assert_eq!(f.memberships.count().await, 0);
    }

    #[tokio::test]
    async fn persistence_failure_marks_session_failed() {
        let f = fixture().await;
        f.memberships.fail_writes(true);
        let checkout =
            CompletedCheckout::from_event(&completed_event("cs_1", WALLET, "paid")).unwrap();

        let report = f
            .reconciler
            .reconcile(&checkout, StripeEventType::CheckoutSessionCompleted)
            .await;

        assert!(matches!(report.result, Err(WebhookError::Persistence(_))));
        assert_eq!(report.session.state(), ReconciliationState::Failed);
        assert!(report.session.failure().is_some());
        assert_eq!(f.memberships.count().await, 0);
    }

    #[tokio::test]
    async fn persistence_failure_is_not_retried_in_process() {
        let f = fixture().await;
        f.memberships.fail_writes(true);
        let event = completed_event("cs_1", WALLET, "paid");

        assert!(f.reconciler.handle(&event).await.is_err());

        // Store recovers; only a new delivery creates the row.
        f.memberships.fail_writes(false);
        assert_eq!(f.memberships.count().await, 0);
        assert!(f.reconciler.handle(&event).await.is_ok());
        assert_eq!(f.memberships.count().await, 1);
    }

    #[tokio::test]
    async fn unpaid_completion_is_ignored() {
        let f = fixture().await;
        let err = f
            .reconciler
            .handle(&completed_event("cs_1", WALLET, "unpaid"))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::Ignored(_)));
        assert_eq!(f.memberships.count().await, 0);
    }

    #[tokio::test]
    async fn missing_metadata_is_rejected() {
        let f = fixture().await;
        let event = StripeEventBuilder::new()
            .object(json!({
                "id": "cs_1",
                "payment_status": "paid",
                "metadata": { "tier": "pro", "level": "2" }
            }))
            .build();

        let err = f.reconciler.handle(&event).await.unwrap_err();
        assert_eq!(err, WebhookError::MissingMetadata("walletAddress"));
        assert_eq!(f.memberships.count().await, 0);
    }

    #[test]
    fn handles_completion_and_async_success() {
        let reconciler = MembershipReconciler::new(
            Arc::new(InMemoryMembershipRepository::new()),
            Arc::new(InMemoryUserDirectory::new()),
        );
        let handled = reconciler.handles();
        assert!(handled.contains(&StripeEventType::CheckoutSessionCompleted));
        assert!(handled.contains(&StripeEventType::CheckoutSessionAsyncPaymentSucceeded));
        assert!(!handled.contains(&StripeEventType::CheckoutSessionExpired));
    }
}
