use crate::checkout::types::PaymentIntentResponse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Point-in-time view of the checkout, exposed to the owning UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutState {
    pub client_secret: Option<String>,
    pub loading: bool,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub is_group_registration: bool,
    pub error_details: Option<String>,
    pub request_id: Option<String>,
    pub retry_count: u32,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self {
            client_secret: None,
            loading: false,
            amount: 0,
            currency: "USD".to_string(),
            is_group_registration: false,
            error_details: None,
            request_id: None,
            retry_count: 0,
        }
    }
}

/// Shared handle scoped to one checkout UI session. Cloned between the
/// orchestrator and the owning component; once closed, every mutation is a
/// no-op, so a late network response cannot touch a torn-down consumer.
#[derive(Clone, Default)]
pub struct CheckoutSession {
    state: Arc<RwLock<CheckoutState>>,
    closed: Arc<AtomicBool>,
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> CheckoutState {
        self.state.read().await.clone()
    }

    pub async fn retry_count(&self) -> u32 {
        self.state.read().await.retry_count
    }

    /// All writes funnel through here; the closed flag is re-checked under
    /// the lock so a concurrent `close` cannot race a mutation in.
    async fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut CheckoutState),
    {
        if self.is_closed() {
            debug!("ignoring state mutation on closed checkout session");
            return false;
        }
        let mut state = self.state.write().await;
        if self.is_closed() {
            debug!("ignoring state mutation on closed checkout session");
            return false;
        }
        f(&mut state);
        true
    }

    /// Apply a creation response: a client secret carries amount, currency
    /// and the group flag with it; a request id is recorded whenever present.
    pub(crate) async fn update_payment_state(&self, response: &PaymentIntentResponse) -> bool {
        self.mutate(|state| {
            if let Some(secret) = &response.client_secret {
                state.client_secret = Some(secret.clone());
                state.amount = response.amount.unwrap_or(0);
                state.currency = response
                    .currency
                    .clone()
                    .unwrap_or_else(|| "USD".to_string());
                state.is_group_registration = response.is_group_registration;
                state.error_details = None;
            }
            if let Some(request_id) = &response.request_id {
                state.request_id = Some(request_id.clone());
            }
        })
        .await
    }

    /// Manual retry from the UI: clear the stale secret and error so the
    /// owning component re-runs the creation flow.
    pub async fn reset_for_retry(&self) -> bool {
        self.mutate(|state| {
            state.client_secret = None;
            state.error_details = None;
            state.retry_count += 1;
        })
        .await
    }

    pub(crate) async fn set_loading(&self, loading: bool) -> bool {
        self.mutate(|state| state.loading = loading).await
    }

    pub(crate) async fn record_error(&self, details: &str) -> bool {
        self.mutate(|state| state.error_details = Some(details.to_string()))
            .await
    }

    pub(crate) async fn bump_retry_count(&self) -> bool {
        self.mutate(|state| state.retry_count += 1).await
    }

    pub(crate) async fn reset_retry_count(&self) -> bool {
        self.mutate(|state| state.retry_count = 0).await
    }
}
