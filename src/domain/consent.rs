//! Consent record domain model
//!
//! A [`ConsentRecord`] is one registry-ready consent after normalization.
//! Records are built by the normalizer from raw table rows and are never
//! mutated afterwards.

use super::ids::Recipient;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual representation of `consentDate` on the wire
pub const CONSENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether the recipient granted or revoked consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    /// Consent given
    #[serde(rename = "ONAY")]
    Granted,
    /// Consent withdrawn
    #[serde(rename = "RET")]
    Revoked,
}

impl ApprovalStatus {
    /// Maps the `1`/`0` approval flag of the input table
    ///
    /// Only a literal `1` grants consent; anything else revokes it.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim() == "1" {
            ApprovalStatus::Granted
        } else {
            ApprovalStatus::Revoked
        }
    }

    /// Registry vocabulary for the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Granted => "ONAY",
            ApprovalStatus::Revoked => "RET",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient category; uploads only ever target individuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecipientType {
    /// An individual person
    #[default]
    #[serde(rename = "BIREYSEL")]
    Individual,
}

/// Deduplication key: one consent per recipient and consent type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub recipient: Recipient,
    pub consent_type: String,
}

/// A normalized consent ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentRecord {
    /// 1-based data row of the input table this record came from
    pub row: usize,

    /// Canonical recipient phone number
    pub recipient: Recipient,

    /// Upper-cased consent type (e.g. `MESAJ`, `ARAMA`, `EPOSTA`)
    pub consent_type: String,

    /// Consent source (e.g. `HS_WEB`), may be empty
    pub source: String,

    /// Granted or revoked
    pub approval_status: ApprovalStatus,

    /// When consent was given or withdrawn
    pub consent_date: NaiveDateTime,

    /// Always [`RecipientType::Individual`]
    pub recipient_type: RecipientType,
}

impl ConsentRecord {
    /// Key used to collapse repeated consents
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            recipient: self.recipient.clone(),
            consent_type: self.consent_type.clone(),
        }
    }

    /// `consentDate` as sent to the registry
    pub fn consent_date_text(&self) -> String {
        self.consent_date.format(CONSENT_DATE_FORMAT).to_string()
    }
}
