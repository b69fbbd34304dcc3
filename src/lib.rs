//! Resilient payment-intent orchestration for conference ticket checkout.
//!
//! The orchestrator debounces submit attempts, dispatches attempt-tagged
//! create-intent requests against an opaque backend boundary, absorbs
//! transient failures with bounded jittered backoff, and drives a one-shot
//! confirmation state machine against the payment processor.

pub mod checkout;
pub mod config;
pub mod logging;
pub mod services;

pub use checkout::backend::{ConfirmationGateway, IntentBackend};
pub use checkout::error::{CheckoutError, CheckoutResult};
pub use checkout::events::CheckoutEvents;
pub use checkout::http::{HttpIntentBackend, IntentBackendConfig};
pub use checkout::types::{
    ConfirmationReply, ConfirmationResult, IntentOutcome, IntentSnapshot, IntentStatus,
    PaymentIntentRequest, PaymentIntentResponse, ProcessorError, PurchaseDetails, TicketType,
};
pub use config::CheckoutConfig;
pub use services::confirmation::{ConfirmState, ConfirmationFlow};
pub use services::orchestrator::{CreateOutcome, IntentOrchestrator, SkipReason};
pub use services::retry::RetryPolicy;
pub use services::state::{CheckoutSession, CheckoutState};
