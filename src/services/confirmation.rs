use crate::checkout::backend::ConfirmationGateway;
use crate::checkout::events::CheckoutEvents;
use crate::checkout::types::{ConfirmationReply, ConfirmationResult, IntentStatus};
use crate::config::CheckoutConfig;
use crate::services::guards::{OneShot, TimeoutMonitor};
use crate::services::state::CheckoutSession;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

const TIMEOUT_MESSAGE: &str = "This is taking longer than expected. Please try again";
const NO_RESPONSE_MESSAGE: &str =
    "Something went wrong while confirming your payment. Please try again";
const PROCESSING_MESSAGE: &str = "Your payment is processing...";
const REQUIRES_ACTION_MESSAGE: &str =
    "Additional verification is required to complete your payment";
const REQUIRES_PAYMENT_METHOD_MESSAGE: &str =
    "Your payment was not completed. Please try another payment method";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmState {
    Idle,
    Processing,
    Success,
    Error,
    RequiresAction,
}

impl std::fmt::Display for ConfirmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmState::Idle => write!(f, "idle"),
            ConfirmState::Processing => write!(f, "processing"),
            ConfirmState::Success => write!(f, "success"),
            ConfirmState::Error => write!(f, "error"),
            ConfirmState::RequiresAction => write!(f, "requires_action"),
        }
    }
}

impl ConfirmState {
    pub fn valid_transitions(&self) -> &'static [ConfirmState] {
        match self {
            ConfirmState::Idle => &[ConfirmState::Processing],
            ConfirmState::Processing => &[
                ConfirmState::Success,
                ConfirmState::Error,
                ConfirmState::RequiresAction,
            ],
            // A pending user action (e.g. a 3-D Secure challenge) loops back
            // into processing on the next confirmation call.
            ConfirmState::RequiresAction => &[ConfirmState::Processing],
            ConfirmState::Success => &[],
            ConfirmState::Error => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConfirmState::Success | ConfirmState::Error)
    }
}

fn transition(state: &Arc<Mutex<ConfirmState>>, target: ConfirmState) -> bool {
    let mut current = lock_state(state);
    if current.valid_transitions().contains(&target) {
        debug!(from = %*current, to = %target, "confirmation state transition");
        *current = target;
        true
    } else {
        false
    }
}

fn lock_state(state: &Arc<Mutex<ConfirmState>>) -> MutexGuard<'_, ConfirmState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Drives the confirmation step against the payment processor and reports
/// exactly one terminal outcome through one-shot callback guards.
pub struct ConfirmationFlow {
    gateway: Arc<dyn ConfirmationGateway>,
    events: Arc<dyn CheckoutEvents>,
    session: CheckoutSession,
    confirm_timeout: Duration,
    state: Arc<Mutex<ConfirmState>>,
    success_once: Arc<OneShot>,
    error_once: Arc<OneShot>,
}

impl ConfirmationFlow {
    pub fn new(
        gateway: Arc<dyn ConfirmationGateway>,
        events: Arc<dyn CheckoutEvents>,
        session: CheckoutSession,
        config: &CheckoutConfig,
    ) -> Self {
        Self {
            gateway,
            events,
            session,
            confirm_timeout: config.confirm_timeout(),
            state: Arc::new(Mutex::new(ConfirmState::Idle)),
            success_once: Arc::new(OneShot::default()),
            error_once: Arc::new(OneShot::default()),
        }
    }

    pub fn state(&self) -> ConfirmState {
        *lock_state(&self.state)
    }

    pub async fn handle_confirm_payment(&self, client_secret: &str) -> ConfirmationResult {
        if !transition(&self.state, ConfirmState::Processing) {
            debug!(state = %self.state(), "confirmation call ignored");
            return ConfirmationResult::AlreadyProcessing;
        }

        let mut monitor = TimeoutMonitor::new(self.confirm_timeout);
        {
            let state = Arc::clone(&self.state);
            let events = Arc::clone(&self.events);
            let session = self.session.clone();
            let error_once = Arc::clone(&self.error_once);
            monitor.arm(move || {
                if !transition(&state, ConfirmState::Error) {
                    return;
                }
                warn!("confirmation timed out waiting for the payment processor");
                if !session.is_closed() && error_once.fire() {
                    events.set_message(Some(TIMEOUT_MESSAGE));
                    events.on_error(TIMEOUT_MESSAGE);
                }
            });
        }

        let reply = self.gateway.confirm_payment(client_secret).await;
        monitor.disarm();

        match reply {
            Ok(reply) => self.apply_reply(reply).await,
            Err(err) => {
                warn!(error = %err, "confirmation call failed");
                let message = err.user_message();
                self.fail(&message).await;
                ConfirmationResult::PaymentError { message }
            }
        }
    }

    async fn apply_reply(&self, reply: ConfirmationReply) -> ConfirmationResult {
        if let Some(error) = reply.error {
            // Processor errors are surfaced verbatim, never auto-retried.
            self.fail(&error.message).await;
            return ConfirmationResult::PaymentError {
                message: error.message,
            };
        }

        match reply.payment_intent {
            Some(intent) => match intent.status {
                IntentStatus::Succeeded => {
                    let advanced = transition(&self.state, ConfirmState::Success);
                    if advanced && !self.session.is_closed() && self.success_once.fire() {
                        info!(
                            intent_id = intent.id.as_deref().unwrap_or("-"),
                            "payment confirmed"
                        );
                        self.events.set_message(None);
                        self.events.on_success();
                    }
                    ConfirmationResult::Success { intent }
                }
                IntentStatus::Processing => self.pending(IntentStatus::Processing, PROCESSING_MESSAGE),
                IntentStatus::RequiresPaymentMethod => self.pending(
                    IntentStatus::RequiresPaymentMethod,
                    REQUIRES_PAYMENT_METHOD_MESSAGE,
                ),
                IntentStatus::RequiresAction => {
                    self.pending(IntentStatus::RequiresAction, REQUIRES_ACTION_MESSAGE)
                }
            },
            None => {
                warn!("confirmation returned neither an error nor an intent");
                self.fail(NO_RESPONSE_MESSAGE).await;
                ConfirmationResult::NoResponse
            }
        }
    }

    /// In-progress statuses surface a status message without touching the
    /// one-shot success/error callbacks.
    fn pending(&self, status: IntentStatus, message: &str) -> ConfirmationResult {
        transition(&self.state, ConfirmState::RequiresAction);
        info!(status = %status, "confirmation pending further action");
        if !self.session.is_closed() {
            self.events.set_message(Some(message));
        }
        ConfirmationResult::RequiresAction { status }
    }

    async fn fail(&self, message: &str) {
        transition(&self.state, ConfirmState::Error);
        self.session.record_error(message).await;
        if !self.session.is_closed() && self.error_once.fire() {
            self.events.set_message(None);
            self.events.on_error(message);
        }
    }
}
