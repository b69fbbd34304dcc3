use thiserror::Error;

pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    TimeoutError { timeout_secs: u64 },

    #[error("Rate limit exceeded: {message}")]
    RateLimitError {
        message: String,
        retry_after_seconds: Option<u64>,
    },

    #[error("Payment declined: {message}")]
    PaymentDeclinedError {
        message: String,
        decline_code: Option<String>,
    },

    #[error("Backend error: {message}")]
    BackendError {
        message: String,
        details: Option<String>,
        retryable: bool,
    },

    #[error("Empty response from the payment service")]
    NoResponse,
}

impl CheckoutError {
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::ValidationError { .. } => false,
            CheckoutError::NetworkError { .. } => true,
            CheckoutError::TimeoutError { .. } => true,
            CheckoutError::RateLimitError { .. } => true,
            CheckoutError::PaymentDeclinedError { .. } => false,
            CheckoutError::BackendError { retryable, .. } => *retryable,
            CheckoutError::NoResponse => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::ValidationError { message, .. } => message.clone(),
            CheckoutError::NetworkError { .. } => {
                "Network error. Please check your internet connection and try again".to_string()
            }
            CheckoutError::TimeoutError { .. } => {
                "The payment service took too long to respond. Please try again".to_string()
            }
            CheckoutError::RateLimitError { .. } => {
                "Too many requests. Please wait a moment and try again".to_string()
            }
            // Processor-side declines are surfaced verbatim, never rephrased.
            CheckoutError::PaymentDeclinedError { message, .. } => message.clone(),
            CheckoutError::BackendError {
                message, details, ..
            } => details.clone().unwrap_or_else(|| message.clone()),
            CheckoutError::NoResponse => {
                "No response from the payment service. Please try again".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_flags_are_set() {
        assert!(CheckoutError::NetworkError {
            message: "connection reset".to_string()
        }
        .is_retryable());
        assert!(CheckoutError::TimeoutError { timeout_secs: 30 }.is_retryable());
        assert!(CheckoutError::RateLimitError {
            message: "limited".to_string(),
            retry_after_seconds: Some(30)
        }
        .is_retryable());
        assert!(!CheckoutError::ValidationError {
            message: "email is required".to_string(),
            field: Some("email".to_string())
        }
        .is_retryable());
        assert!(!CheckoutError::PaymentDeclinedError {
            message: "Your card was declined".to_string(),
            decline_code: Some("card_declined".to_string())
        }
        .is_retryable());
        assert!(!CheckoutError::NoResponse.is_retryable());
    }

    #[test]
    fn backend_error_retryability_follows_flag() {
        let transient = CheckoutError::BackendError {
            message: "upstream unavailable".to_string(),
            details: None,
            retryable: true,
        };
        let terminal = CheckoutError::BackendError {
            message: "ticket type sold out".to_string(),
            details: None,
            retryable: false,
        };
        assert!(transient.is_retryable());
        assert!(!terminal.is_retryable());
    }

    #[test]
    fn user_messages_give_actionable_guidance() {
        let timeout = CheckoutError::TimeoutError { timeout_secs: 30 };
        assert!(timeout.user_message().contains("took too long"));

        let network = CheckoutError::NetworkError {
            message: "dns failure".to_string(),
        };
        assert!(network.user_message().contains("internet connection"));

        let declined = CheckoutError::PaymentDeclinedError {
            message: "Your card was declined.".to_string(),
            decline_code: None,
        };
        assert_eq!(declined.user_message(), "Your card was declined.");
    }

    #[test]
    fn backend_error_prefers_human_readable_details() {
        let err = CheckoutError::BackendError {
            message: "invalid_request".to_string(),
            details: Some("Group registrations require at least 5 attendees".to_string()),
            retryable: false,
        };
        assert_eq!(
            err.user_message(),
            "Group registrations require at least 5 attendees"
        );
    }
}
