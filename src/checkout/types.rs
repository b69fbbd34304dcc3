use crate::checkout::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    Standard,
    Student,
    Group,
    Speaker,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Standard => "standard",
            TicketType::Student => "student",
            TicketType::Group => "group",
            TicketType::Speaker => "speaker",
        }
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = CheckoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "standard" | "regular" => Ok(TicketType::Standard),
            "student" => Ok(TicketType::Student),
            "group" => Ok(TicketType::Group),
            "speaker" => Ok(TicketType::Speaker),
            _ => Err(CheckoutError::ValidationError {
                message: format!("unsupported ticket type: {}", value),
                field: Some("ticket_type".to_string()),
            }),
        }
    }
}

/// What the purchaser typed into the checkout form.
#[derive(Debug, Clone)]
pub struct PurchaseDetails {
    pub ticket_type: TicketType,
    pub email: String,
    pub full_name: String,
    pub group_size: Option<u32>,
}

impl PurchaseDetails {
    /// Trim and check required fields before any dispatch is allowed.
    pub fn validated(self) -> CheckoutResult<PurchaseDetails> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(CheckoutError::ValidationError {
                message: "email is required".to_string(),
                field: Some("email".to_string()),
            });
        }

        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(CheckoutError::ValidationError {
                message: "full name is required".to_string(),
                field: Some("full_name".to_string()),
            });
        }

        if let Some(size) = self.group_size {
            if size == 0 {
                return Err(CheckoutError::ValidationError {
                    message: "group size must be a positive number".to_string(),
                    field: Some("group_size".to_string()),
                });
            }
        }
        if self.ticket_type == TicketType::Group && self.group_size.is_none() {
            return Err(CheckoutError::ValidationError {
                message: "group size is required for group tickets".to_string(),
                field: Some("group_size".to_string()),
            });
        }

        Ok(PurchaseDetails {
            ticket_type: self.ticket_type,
            email,
            full_name,
            group_size: self.group_size,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub ticket_type: TicketType,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_size: Option<u32>,
    /// Unique per physical network attempt, never reused across retries. The
    /// backend boundary is expected to deduplicate on it; that behavior is
    /// not verified from this side.
    pub attempt_id: String,
    pub is_retry: bool,
}

impl PaymentIntentRequest {
    pub fn from_purchase(purchase: &PurchaseDetails, attempt_id: String, is_retry: bool) -> Self {
        Self {
            ticket_type: purchase.ticket_type,
            email: purchase.email.clone(),
            full_name: purchase.full_name.clone(),
            group_size: purchase.group_size,
            attempt_id,
            is_retry,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Amount in minor currency units.
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_group_registration: bool,
    #[serde(default)]
    pub free_ticket: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Terminal classification of a creation response. Exactly one variant holds
/// for a well-formed response; anything else is `Malformed` and surfaced as
/// "no response".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Created {
        client_secret: String,
        amount: i64,
        currency: String,
        is_group_registration: bool,
    },
    /// Speaker comps complete the checkout without a payment step.
    FreeTicket,
    Failed {
        error: String,
        details: Option<String>,
    },
    Malformed,
}

impl PaymentIntentResponse {
    pub fn outcome(&self) -> IntentOutcome {
        if self.free_ticket {
            return IntentOutcome::FreeTicket;
        }
        if let Some(error) = &self.error {
            return IntentOutcome::Failed {
                error: error.clone(),
                details: self.details.clone(),
            };
        }
        if let Some(secret) = &self.client_secret {
            return IntentOutcome::Created {
                client_secret: secret.clone(),
                amount: self.amount.unwrap_or(0),
                currency: self
                    .currency
                    .clone()
                    .unwrap_or_else(|| "USD".to_string()),
                is_group_registration: self.is_group_registration,
            };
        }
        IntentOutcome::Malformed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    RequiresAction,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresAction => "requires_action",
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntentSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    pub status: IntentStatus,
}

/// What the confirmation boundary hands back: an immediate error, an intent
/// snapshot, or (anomalously) neither.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationReply {
    #[serde(default)]
    pub error: Option<ProcessorError>,
    #[serde(default)]
    pub payment_intent: Option<IntentSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationResult {
    Success { intent: IntentSnapshot },
    PaymentError { message: String },
    RequiresAction { status: IntentStatus },
    NoResponse,
    AlreadyProcessing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_type_parses_and_round_trips() {
        assert_eq!(
            TicketType::from_str(" Student ").expect("should parse"),
            TicketType::Student
        );
        assert_eq!(
            TicketType::from_str("regular").expect("should parse"),
            TicketType::Standard
        );
        assert!(TicketType::from_str("vip").is_err());
        assert_eq!(TicketType::Group.to_string(), "group");
    }

    #[test]
    fn validation_trims_and_requires_fields() {
        let purchase = PurchaseDetails {
            ticket_type: TicketType::Standard,
            email: "  ada@example.com ".to_string(),
            full_name: " Ada Lovelace ".to_string(),
            group_size: None,
        };
        let validated = purchase.validated().expect("should validate");
        assert_eq!(validated.email, "ada@example.com");
        assert_eq!(validated.full_name, "Ada Lovelace");

        let missing_email = PurchaseDetails {
            ticket_type: TicketType::Standard,
            email: "   ".to_string(),
            full_name: "Ada Lovelace".to_string(),
            group_size: None,
        };
        assert!(matches!(
            missing_email.validated(),
            Err(CheckoutError::ValidationError { field: Some(f), .. }) if f == "email"
        ));
    }

    #[test]
    fn group_tickets_require_a_positive_group_size() {
        let no_size = PurchaseDetails {
            ticket_type: TicketType::Group,
            email: "lead@example.com".to_string(),
            full_name: "Team Lead".to_string(),
            group_size: None,
        };
        assert!(no_size.validated().is_err());

        let zero_size = PurchaseDetails {
            ticket_type: TicketType::Group,
            email: "lead@example.com".to_string(),
            full_name: "Team Lead".to_string(),
            group_size: Some(0),
        };
        assert!(zero_size.validated().is_err());

        let ok = PurchaseDetails {
            ticket_type: TicketType::Group,
            email: "lead@example.com".to_string(),
            full_name: "Team Lead".to_string(),
            group_size: Some(6),
        };
        assert!(ok.validated().is_ok());
    }

    #[test]
    fn intent_request_serializes_to_camel_case() {
        let request = PaymentIntentRequest {
            ticket_type: TicketType::Group,
            email: "lead@example.com".to_string(),
            full_name: "Team Lead".to_string(),
            group_size: Some(6),
            attempt_id: "a-1".to_string(),
            is_retry: true,
        };
        let json = serde_json::to_value(&request).expect("serialization should succeed");
        assert_eq!(json["ticketType"], "group");
        assert_eq!(json["fullName"], "Team Lead");
        assert_eq!(json["groupSize"], 6);
        assert_eq!(json["attemptId"], "a-1");
        assert_eq!(json["isRetry"], true);
    }

    #[test]
    fn intent_response_deserializes_and_classifies_success() {
        let payload = serde_json::json!({
            "clientSecret": "sk_test_abc",
            "amount": 19900,
            "currency": "USD",
            "requestId": "req_42"
        });
        let response: PaymentIntentResponse =
            serde_json::from_value(payload).expect("deserialization should succeed");
        assert_eq!(
            response.outcome(),
            IntentOutcome::Created {
                client_secret: "sk_test_abc".to_string(),
                amount: 19900,
                currency: "USD".to_string(),
                is_group_registration: false,
            }
        );
    }

    #[test]
    fn classification_covers_each_terminal_shape() {
        let free: PaymentIntentResponse =
            serde_json::from_value(serde_json::json!({"freeTicket": true}))
                .expect("deserialization should succeed");
        assert_eq!(free.outcome(), IntentOutcome::FreeTicket);

        let failed: PaymentIntentResponse = serde_json::from_value(serde_json::json!({
            "error": "sold_out",
            "details": "Standard tickets are sold out"
        }))
        .expect("deserialization should succeed");
        assert_eq!(
            failed.outcome(),
            IntentOutcome::Failed {
                error: "sold_out".to_string(),
                details: Some("Standard tickets are sold out".to_string()),
            }
        );

        let empty = PaymentIntentResponse::default();
        assert_eq!(empty.outcome(), IntentOutcome::Malformed);
    }

    #[test]
    fn missing_amount_and_currency_fall_back_to_defaults() {
        let response: PaymentIntentResponse =
            serde_json::from_value(serde_json::json!({"clientSecret": "sk_test_abc"}))
                .expect("deserialization should succeed");
        match response.outcome() {
            IntentOutcome::Created {
                amount, currency, ..
            } => {
                assert_eq!(amount, 0);
                assert_eq!(currency, "USD");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn confirmation_reply_deserializes_processor_shapes() {
        let reply: ConfirmationReply = serde_json::from_value(serde_json::json!({
            "paymentIntent": {"id": "pi_123", "status": "requires_action"}
        }))
        .expect("deserialization should succeed");
        assert!(reply.error.is_none());
        assert_eq!(
            reply.payment_intent.expect("intent should be present").status,
            IntentStatus::RequiresAction
        );

        let errored: ConfirmationReply = serde_json::from_value(serde_json::json!({
            "error": {"message": "Your card was declined.", "declineCode": "card_declined"}
        }))
        .expect("deserialization should succeed");
        let error = errored.error.expect("error should be present");
        assert_eq!(error.decline_code.as_deref(), Some("card_declined"));
    }
}
