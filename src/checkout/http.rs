use crate::checkout::backend::IntentBackend;
use crate::checkout::error::{CheckoutError, CheckoutResult};
use crate::checkout::types::{PaymentIntentRequest, PaymentIntentResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct IntentBackendConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl IntentBackendConfig {
    pub fn from_env() -> CheckoutResult<Self> {
        let base_url =
            std::env::var("CHECKOUT_BACKEND_URL").map_err(|_| CheckoutError::ValidationError {
                message: "CHECKOUT_BACKEND_URL environment variable is required".to_string(),
                field: Some("CHECKOUT_BACKEND_URL".to_string()),
            })?;
        let api_key = std::env::var("CHECKOUT_BACKEND_API_KEY").map_err(|_| {
            CheckoutError::ValidationError {
                message: "CHECKOUT_BACKEND_API_KEY environment variable is required".to_string(),
                field: Some("CHECKOUT_BACKEND_API_KEY".to_string()),
            }
        })?;

        Ok(Self {
            base_url,
            api_key,
            timeout_secs: std::env::var("CHECKOUT_BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        })
    }
}

/// JSON-over-HTTP implementation of the create-intent RPC boundary.
pub struct HttpIntentBackend {
    config: IntentBackendConfig,
    client: Client,
}

impl HttpIntentBackend {
    pub fn new(config: IntentBackendConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CheckoutError::NetworkError {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(IntentBackendConfig::from_env()?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn classify_transport_error(&self, err: reqwest::Error) -> CheckoutError {
        if err.is_timeout() {
            return CheckoutError::TimeoutError {
                timeout_secs: self.config.timeout_secs,
            };
        }
        CheckoutError::NetworkError {
            message: format!("create-intent request failed: {}", err),
        }
    }
}

#[async_trait]
impl IntentBackend for HttpIntentBackend {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> CheckoutResult<PaymentIntentResponse> {
        let attempt_id = request.attempt_id.clone();
        debug!(
            attempt_id = %attempt_id,
            ticket_type = %request.ticket_type,
            is_retry = request.is_retry,
            "dispatching create-payment-intent"
        );

        let response = self
            .client
            .post(self.endpoint("/create-payment-intent"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let text = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            return Err(CheckoutError::RateLimitError {
                message: "create-intent rate limit exceeded".to_string(),
                retry_after_seconds: retry_after,
            });
        }
        if !status.is_success() {
            return Err(CheckoutError::BackendError {
                message: format!("HTTP {}", status),
                details: if text.trim().is_empty() {
                    None
                } else {
                    Some(text)
                },
                retryable: status.is_server_error(),
            });
        }

        let parsed: PaymentIntentResponse =
            serde_json::from_str(&text).map_err(|e| CheckoutError::BackendError {
                message: format!("invalid create-intent JSON response: {}", e),
                details: None,
                retryable: false,
            })?;

        if let Some(request_id) = &parsed.request_id {
            info!(attempt_id = %attempt_id, request_id = %request_id, "create-payment-intent responded");
        }
        Ok(parsed)
    }
}
