//! Wire types for the IYS consent registry API
//!
//! Request bodies borrow from the domain records; response bodies are
//! deserialized leniently because the registry adds fields over time.

use crate::domain::{ApprovalStatus, ConsentRecord, RecipientType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One consent in the body of a consent request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentPayload<'a> {
    pub recipient: &'a str,
    #[serde(rename = "type")]
    pub consent_type: &'a str,
    pub source: &'a str,
    pub status: ApprovalStatus,
    pub consent_date: String,
    pub recipient_type: RecipientType,
}

impl<'a> From<&'a ConsentRecord> for ConsentPayload<'a> {
    fn from(record: &'a ConsentRecord) -> Self {
        Self {
            recipient: record.recipient.as_str(),
            consent_type: &record.consent_type,
            source: &record.source,
            status: record.approval_status,
            consent_date: record.consent_date_text(),
            recipient_type: record.recipient_type,
        }
    }
}

/// Password grant form sent to the token endpoint
#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrantRequest<'a> {
    pub grant_type: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// Consent request response
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(rename = "requestId", default)]
    pub request_id: Option<Value>,
}

impl SubmitResponse {
    /// Request id as text; the registry may send it as a string or a number
    pub fn request_id_text(&self) -> Option<String> {
        match &self.request_id {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Status of one consent inside a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRequestStatus {
    /// Position of the consent in the submitted array
    #[serde(default)]
    pub index: Option<usize>,

    /// Registry status, e.g. `ENQUEUE`, `COMPLETED`, `FAILED`
    #[serde(default)]
    pub status: String,

    /// Error detail attached by the registry, shape varies
    #[serde(default)]
    pub error: Option<Value>,
}

impl SubRequestStatus {
    /// Human-readable error detail, when the registry attached one
    pub fn error_detail(&self) -> Option<String> {
        self.error.as_ref().and_then(describe_error)
    }
}

/// Aggregate status object some registry versions return instead of a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed_count: Option<usize>,
    #[serde(default)]
    pub failed_count: Option<usize>,
    #[serde(default)]
    pub sub_request_errors: Vec<Value>,
}

/// Body of a status response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusResponse {
    /// One entry per submitted consent
    Items(Vec<SubRequestStatus>),
    /// Aggregate counts for the whole request
    Summary(RequestSummary),
}

impl StatusResponse {
    /// Number of per-consent entries in the response
    pub fn item_count(&self) -> usize {
        match self {
            StatusResponse::Items(items) => items.len(),
            StatusResponse::Summary(summary) => {
                summary.completed_count.unwrap_or(0)
                    + summary
                        .failed_count
                        .unwrap_or(summary.sub_request_errors.len())
            }
        }
    }
}

/// Extracts a readable message from a registry error value
///
/// Objects yield their `message` (with `code` when present), strings are
/// taken as-is, and anything else falls back to its JSON text.
pub fn describe_error(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            let message = map.get("message").and_then(Value::as_str);
            let code = map.get("code").and_then(Value::as_str);
            match (code, message) {
                (Some(code), Some(message)) => Some(format!("{code}: {message}")),
                (None, Some(message)) => Some(message.to_string()),
                _ => Some(error.to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}
