use crate::checkout::error::CheckoutResult;
use crate::checkout::types::{ConfirmationReply, PaymentIntentRequest, PaymentIntentResponse};
use async_trait::async_trait;

#[async_trait]
pub trait IntentBackend: Send + Sync {
    /// One physical network attempt per call. Retry scheduling belongs to the
    /// orchestrator, not the transport.
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> CheckoutResult<PaymentIntentResponse>;
}

#[async_trait]
pub trait ConfirmationGateway: Send + Sync {
    /// Submit the confirmation step for a previously created intent.
    async fn confirm_payment(&self, client_secret: &str) -> CheckoutResult<ConfirmationReply>;
}
