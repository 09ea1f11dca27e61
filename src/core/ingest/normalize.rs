//! Row normalization
//!
//! Turns a [`RawRecord`] into a registry-ready [`ConsentRecord`]. Rows that
//! cannot be submitted (empty recipient or consent type) are dropped with a
//! reason; a malformed consent timestamp fails the whole run.

use super::table::RawRecord;
use crate::domain::{
    ApprovalStatus, ConsentRecord, IysError, Recipient, RecipientType, Result,
};
use chrono::NaiveDateTime;
use std::fmt;

/// Layout of the consent timestamp in the input table
pub const INPUT_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Why a row was left out of the upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Recipient cell had no digits
    EmptyRecipient,
    /// Consent type cell was empty
    EmptyConsentType,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::EmptyRecipient => f.write_str("empty recipient"),
            DropReason::EmptyConsentType => f.write_str("empty consent type"),
        }
    }
}

/// Result of normalizing a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Record(ConsentRecord),
    Dropped(DropReason),
}

/// A row left out of the upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    pub row: usize,
    pub reason: DropReason,
}

/// Records ready for deduplication plus the rows that were dropped
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<ConsentRecord>,
    pub dropped: Vec<DroppedRow>,
}

/// Parses an input timestamp in strict `DD-MM-YYYY HH:MM:SS` layout
///
/// # Errors
///
/// Returns a validation error naming the row and the offending text.
pub fn parse_consent_timestamp(text: &str, row: usize) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), INPUT_TIMESTAMP_FORMAT).map_err(|_| {
        IysError::Validation(format!(
            "Row {row}: consent date '{text}' is not in DD-MM-YYYY HH:MM:SS format"
        ))
    })
}

/// Normalizes one raw row
///
/// # Errors
///
/// Returns a validation error when the consent timestamp is malformed.
pub fn normalize_record(raw: &RawRecord) -> Result<Normalized> {
    let consent_date = parse_consent_timestamp(&raw.consent_timestamp, raw.row)?;

    let recipient = match Recipient::normalize(&raw.recipient) {
        Ok(recipient) => recipient,
        Err(_) => return Ok(Normalized::Dropped(DropReason::EmptyRecipient)),
    };

    let consent_type = raw.consent_type.trim().to_uppercase();
    if consent_type.is_empty() {
        return Ok(Normalized::Dropped(DropReason::EmptyConsentType));
    }

    Ok(Normalized::Record(ConsentRecord {
        row: raw.row,
        recipient,
        consent_type,
        source: raw.source.trim().to_string(),
        approval_status: ApprovalStatus::from_flag(&raw.approval_flag),
        consent_date,
        recipient_type: RecipientType::Individual,
    }))
}

/// Normalizes every row, in input order
///
/// # Errors
///
/// Stops at the first malformed timestamp.
pub fn normalize_all(raws: &[RawRecord]) -> Result<NormalizeOutcome> {
    let mut outcome = NormalizeOutcome::default();

    for raw in raws {
        match normalize_record(raw)? {
            Normalized::Record(record) => outcome.records.push(record),
            Normalized::Dropped(reason) => {
                tracing::debug!(row = raw.row, reason = %reason, "Row dropped");
                outcome.dropped.push(DroppedRow {
                    row: raw.row,
                    reason,
                });
            }
        }
    }

    Ok(outcome)
}
