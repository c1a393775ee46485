//! Per-session reconciliation state machine.
//!
//! ```text
//! Pending ──► Completed ──► Reconciled
//!    │            │
//!    └────────────┴──────► Failed
//! ```
//!
//! `Reconciled` and `Failed` are terminal. A `Failed` session is left for
//! manual reconciliation or for the provider's redelivery, which starts a
//! fresh `Pending` tracker.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::StateMachine;

use super::webhook_errors::WebhookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationState {
    /// Event received and verified; session not yet examined.
    Pending,
    /// Session is paid and its metadata resolved to a user.
    Completed,
    /// A membership row exists for the session.
    Reconciled,
    /// Reconciliation stopped; requires operator attention or redelivery.
    Failed,
}

impl StateMachine for ReconciliationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ReconciliationState::*;
        matches!(
            (self, target),
            (Pending, Completed) | (Pending, Failed) | (Completed, Reconciled) | (Completed, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ReconciliationState::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed => vec![Reconciled, Failed],
            Reconciled | Failed => vec![],
        }
    }
}

impl fmt::Display for ReconciliationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReconciliationState::Pending => "pending",
            ReconciliationState::Completed => "completed",
            ReconciliationState::Reconciled => "reconciled",
            ReconciliationState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks one session through reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReconciliation {
    session_id: String,
    state: ReconciliationState,
    failure: Option<String>,
}

impl SessionReconciliation {
    pub fn start(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            state: ReconciliationState::Pending,
            failure: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> ReconciliationState {
        self.state
    }

    /// Reason recorded when the session moved to `Failed`.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn complete(&mut self) -> Result<(), WebhookError> {
        self.advance(ReconciliationState::Completed)
    }

    pub fn reconcile(&mut self) -> Result<(), WebhookError> {
        self.advance(ReconciliationState::Reconciled)
    }

    /// Moves to `Failed`, keeping the first recorded reason.
    ///
    /// Failing an already failed session is a no-op.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), WebhookError> {
        if self.state == ReconciliationState::Failed {
            return Ok(());
        }
        self.advance(ReconciliationState::Failed)?;
        self.failure = Some(reason.into());
        Ok(())
    }

    fn advance(&mut self, target: ReconciliationState) -> Result<(), WebhookError> {
        self.state = self.state.transition_to(target).map_err(|_| {
            WebhookError::InvalidTransition(format!(
                "session {} cannot move from {} to {}",
                self.session_id, self.state, target
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_reconciled() {
        let mut tracker = SessionReconciliation::start("cs_1");
        assert_eq!(tracker.state(), ReconciliationState::Pending);

        tracker.complete().unwrap();
        tracker.reconcile().unwrap();

        assert_eq!(tracker.state(), ReconciliationState::Reconciled);
        assert!(tracker.state().is_terminal());
    }

    #[test]
    fn cannot_skip_completed() {
        let mut tracker = SessionReconciliation::start("cs_1");
        assert!(matches!(
            tracker.reconcile(),
            Err(WebhookError::InvalidTransition(_))
        ));
        assert_eq!(tracker.state(), ReconciliationState::Pending);
    }

    #[test]
    fn failed_is_reachable_from_pending_and_completed() {
        let mut from_pending = SessionReconciliation::start("cs_1");
        from_pending.fail("user not found").unwrap();
        assert_eq!(from_pending.state(), ReconciliationState::Failed);
        assert_eq!(from_pending.failure(), Some("user not found"));

        let mut from_completed = SessionReconciliation::start("cs_2");
        from_completed.complete().unwrap();
        from_completed.fail("insert failed").unwrap();
        assert_eq!(from_completed.state(), ReconciliationState::Failed);
    }

    #[test]
    fn failed_is_absorbing() {
        let mut tracker = SessionReconciliation::start("cs_1");
        tracker.fail("first").unwrap();
        tracker.fail("second").unwrap();

        assert_eq!(tracker.failure(), Some("first"));
        assert!(tracker.complete().is_err());
        assert!(ReconciliationState::Failed.is_terminal());
    }

    #[test]
    fn reconciled_cannot_fail() {
        let mut tracker = SessionReconciliation::start("cs_1");
        tracker.complete().unwrap();
        tracker.reconcile().unwrap();
        assert!(tracker.fail("late").is_err());
    }
}
