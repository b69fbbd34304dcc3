//! Payment-intent creation orchestration.
//!
//! Routes a purchase through the debounce and in-flight gates, dispatches
//! attempt-tagged requests against the backend boundary, absorbs transient
//! failures with bounded backoff and applies terminal outcomes to the
//! session state and UI callbacks.

use crate::checkout::backend::IntentBackend;
use crate::checkout::error::{CheckoutError, CheckoutResult};
use crate::checkout::events::CheckoutEvents;
use crate::checkout::types::{
    IntentOutcome, PaymentIntentRequest, PaymentIntentResponse, PurchaseDetails,
};
use crate::config::CheckoutConfig;
use crate::services::guards::{DebounceGuard, OneShot};
use crate::services::retry::{sample_jitter, RetryPolicy};
use crate::services::state::CheckoutSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The attempt ran to a terminal response.
    Completed(IntentOutcome),
    /// The attempt was swallowed by a gate before any dispatch.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Debounced,
    InFlight,
    CoolingDown,
    SessionClosed,
}

pub struct IntentOrchestrator {
    backend: Arc<dyn IntentBackend>,
    events: Arc<dyn CheckoutEvents>,
    session: CheckoutSession,
    policy: RetryPolicy,
    request_timeout: Duration,
    debounce: Mutex<DebounceGuard>,
    in_flight: AtomicBool,
    cooldown_until: Mutex<Option<Instant>>,
    success_once: OneShot,
    error_once: OneShot,
    jitter: fn(Duration) -> Duration,
}

impl IntentOrchestrator {
    pub fn new(
        backend: Arc<dyn IntentBackend>,
        events: Arc<dyn CheckoutEvents>,
        session: CheckoutSession,
        config: &CheckoutConfig,
    ) -> Self {
        Self {
            backend,
            events,
            session,
            policy: config.retry_policy(),
            request_timeout: config.request_timeout(),
            debounce: Mutex::new(DebounceGuard::new(config.debounce_interval())),
            in_flight: AtomicBool::new(false),
            cooldown_until: Mutex::new(None),
            success_once: OneShot::default(),
            error_once: OneShot::default(),
            jitter: sample_jitter,
        }
    }

    /// Deterministic jitter hook so tests can assert exact backoff bounds.
    pub fn with_jitter(mut self, jitter: fn(Duration) -> Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    /// Create a payment intent for the purchase. Rapid repeat calls and calls
    /// issued while a flow is already running are silent no-ops.
    pub async fn create_intent(&self, purchase: PurchaseDetails) -> CheckoutResult<CreateOutcome> {
        if self.session.is_closed() {
            return Ok(CreateOutcome::Skipped(SkipReason::SessionClosed));
        }
        if !self.debounce.lock().await.try_accept() {
            debug!("create intent suppressed by debounce guard");
            return Ok(CreateOutcome::Skipped(SkipReason::Debounced));
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("create intent already in flight");
            return Ok(CreateOutcome::Skipped(SkipReason::InFlight));
        }
        let result = self.run_creation(purchase).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_creation(&self, purchase: PurchaseDetails) -> CheckoutResult<CreateOutcome> {
        {
            let mut cooldown = self.cooldown_until.lock().await;
            if let Some(until) = *cooldown {
                if Instant::now() < until {
                    debug!("creation blocked while the retry cool-down is active");
                    return Ok(CreateOutcome::Skipped(SkipReason::CoolingDown));
                }
                *cooldown = None;
                self.session.reset_retry_count().await;
            }
        }

        let purchase = match purchase.validated() {
            Ok(purchase) => purchase,
            Err(err) => {
                self.session.record_error(&err.user_message()).await;
                return Err(err);
            }
        };

        loop {
            if self.session.is_closed() {
                return Ok(CreateOutcome::Skipped(SkipReason::SessionClosed));
            }

            let retry_count = self.session.retry_count().await;
            let attempt_id = Uuid::new_v4().to_string();
            let request =
                PaymentIntentRequest::from_purchase(&purchase, attempt_id.clone(), retry_count > 0);

            self.session.set_loading(true).await;
            info!(
                attempt_id = %attempt_id,
                ticket_type = %request.ticket_type,
                retry_count,
                "creating payment intent"
            );

            let dispatched = timeout(
                self.request_timeout,
                self.backend.create_payment_intent(request),
            )
            .await;
            let result = match dispatched {
                Ok(result) => result,
                Err(_) => Err(CheckoutError::TimeoutError {
                    timeout_secs: self.request_timeout.as_secs(),
                }),
            };

            match result {
                Ok(response) => {
                    self.session.set_loading(false).await;
                    self.session.reset_retry_count().await;
                    let outcome = self.apply_response(response).await?;
                    return Ok(CreateOutcome::Completed(outcome));
                }
                Err(err) if err.is_retryable() => {
                    if !self.policy.has_budget(retry_count) {
                        self.session.set_loading(false).await;
                        warn!(error = %err, retry_count, "retry budget exhausted");
                        self.begin_cooldown().await;
                        let message = exhausted_message(&err);
                        self.fail(&err, &message).await;
                        return Err(err);
                    }
                    let delay = self
                        .policy
                        .delay_with_jitter(retry_count, (self.jitter)(self.policy.jitter_cap));
                    self.session.bump_retry_count().await;
                    let delay_secs = (delay.as_millis() as u64 + 999) / 1000;
                    warn!(
                        error = %err,
                        attempt = retry_count + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "transient create-intent failure, retrying"
                    );
                    self.set_status(&format!("Connection issue. Retrying in {}s...", delay_secs));
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    self.session.set_loading(false).await;
                    let message = err.user_message();
                    self.fail(&err, &message).await;
                    return Err(err);
                }
            }
        }
    }

    async fn apply_response(
        &self,
        response: PaymentIntentResponse,
    ) -> CheckoutResult<IntentOutcome> {
        let outcome = response.outcome();
        match &outcome {
            IntentOutcome::Created {
                amount, currency, ..
            } => {
                self.session.update_payment_state(&response).await;
                info!(
                    amount = *amount,
                    currency = %currency,
                    request_id = response.request_id.as_deref().unwrap_or("-"),
                    "payment intent ready for confirmation"
                );
                self.clear_status();
                Ok(outcome)
            }
            IntentOutcome::FreeTicket => {
                self.session.update_payment_state(&response).await;
                info!("complimentary ticket granted, no payment required");
                self.clear_status();
                self.fire_success();
                Ok(outcome)
            }
            IntentOutcome::Failed { error, details } => {
                let err = CheckoutError::BackendError {
                    message: error.clone(),
                    details: details.clone(),
                    retryable: false,
                };
                let message = err.user_message();
                self.fail(&err, &message).await;
                Err(err)
            }
            IntentOutcome::Malformed => {
                let err = CheckoutError::NoResponse;
                warn!("create-intent response carried no secret, error or comp flag");
                let message = err.user_message();
                self.fail(&err, &message).await;
                Err(err)
            }
        }
    }

    async fn begin_cooldown(&self) {
        let mut cooldown = self.cooldown_until.lock().await;
        *cooldown = Some(Instant::now() + self.policy.cooldown);
    }

    fn fire_success(&self) {
        if self.session.is_closed() {
            return;
        }
        if self.success_once.fire() {
            self.events.on_success();
        } else {
            debug!("suppressing duplicate success callback");
        }
    }

    async fn fail(&self, err: &CheckoutError, message: &str) {
        self.session.record_error(message).await;
        if self.session.is_closed() {
            return;
        }
        if self.error_once.fire() {
            self.events.set_message(None);
            self.events.on_error(message);
        } else {
            debug!(error = %err, "suppressing duplicate error callback");
        }
    }

    fn set_status(&self, message: &str) {
        if !self.session.is_closed() {
            self.events.set_message(Some(message));
        }
    }

    fn clear_status(&self) {
        if !self.session.is_closed() {
            self.events.set_message(None);
        }
    }
}

/// Terminal guidance after the retry budget is gone, distinguishing
/// rate-limit pressure from plain connectivity failure.
fn exhausted_message(last_error: &CheckoutError) -> String {
    match last_error {
        CheckoutError::RateLimitError { .. } => {
            "The payment service is busy right now. Please try again in a few minutes".to_string()
        }
        _ => "We couldn't reach the payment service. Please check your internet connection and try again"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_distinguishes_rate_limit_from_connectivity() {
        let rate_limited = exhausted_message(&CheckoutError::RateLimitError {
            message: "limited".to_string(),
            retry_after_seconds: None,
        });
        assert!(rate_limited.contains("busy"));

        let offline = exhausted_message(&CheckoutError::NetworkError {
            message: "connection refused".to_string(),
        });
        assert!(offline.contains("internet connection"));
    }
}
