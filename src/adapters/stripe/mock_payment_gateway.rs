//! Mock payment gateway for testing.
//!
//! Provides a configurable implementation of `PaymentGateway` for unit and
//! integration tests. Supports:
//! - Generated sessions echoing the request
//! - Error injection
//! - Call tracking

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{CheckoutSessionHandle, CreateCheckoutRequest, PaymentError, PaymentGateway};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
///
/// // Inject errors
/// mock.set_error(PaymentError::invalid_request("bad currency"));
///
/// let result = mock.create_checkout_session(request).await;
/// assert_eq!(mock.calls().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Every request received, in order.
    call_log: Vec<CreateCheckoutRequest>,

    /// Sessions created so far; drives generated ids.
    created: u32,
}

impl MockPaymentGateway {
    /// Create a new mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose next call fails with `error`.
    pub fn failing_with(error: PaymentError) -> Self {
        let mock = Self::new();
        mock.set_error(error);
        mock
    }

    /// Fail the next call with `error`.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<CreateCheckoutRequest> {
        self.state().call_log.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSessionHandle, PaymentError> {
        let mut state = self.state();
        state.call_log.push(request.clone());

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        state.created += 1;
        let id = format!("cs_test_{}", state.created);
        let amount_total = request
            .items
            .iter()
            .try_fold(0i64, |acc, item| item.total().and_then(|t| acc.checked_add(t)));

        Ok(CheckoutSessionHandle {
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            id,
            amount_total,
            currency: request.items.first().map(|i| i.currency.clone()),
            metadata: request.metadata,
        })
    }
}
