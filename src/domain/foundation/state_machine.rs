//! State machine trait for status enums.
//!
//! Per-session reconciliation state implements this trait so every state
//! change goes through the same validation.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal edges; `transition_to` and `is_terminal`
/// are derived from them.
///
/// ```ignore
/// let next = ReconciliationState::Pending.transition_to(ReconciliationState::Completed)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Delivery {
        Received,
        Verified,
        Applied,
        Rejected,
    }

    impl StateMachine for Delivery {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Delivery::*;
            matches!(
                (self, target),
                (Received, Verified) | (Received, Rejected) | (Verified, Applied)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Delivery::*;
            match self {
                Received => vec![Verified, Rejected],
                Verified => vec![Applied],
                Applied | Rejected => vec![],
            }
        }
    }

    #[test]
    fn transition_to_accepts_listed_edge() {
        assert_eq!(
            Delivery::Received.transition_to(Delivery::Verified),
            Ok(Delivery::Verified)
        );
    }

    #[test]
    fn transition_to_rejects_unlisted_edge() {
        let err = Delivery::Received
            .transition_to(Delivery::Applied)
            .unwrap_err();
        assert!(err.to_string().contains("Received"));
        assert!(err.to_string().contains("Applied"));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(Delivery::Applied.is_terminal());
        assert!(Delivery::Rejected.is_terminal());
        assert!(!Delivery::Received.is_terminal());
    }

    #[test]
    fn can_transition_to_agrees_with_valid_transitions() {
        for state in [
            Delivery::Received,
            Delivery::Verified,
            Delivery::Applied,
            Delivery::Rejected,
        ] {
            for target in state.valid_transitions() {
                assert!(state.can_transition_to(&target), "{:?} -> {:?}", state, target);
            }
        }
    }
}
