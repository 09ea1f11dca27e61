//! Deduplication by (recipient, consent type)
//!
//! The last occurrence of a key wins. Survivors keep the relative order in
//! which their winning occurrence appeared.

use crate::domain::{ConsentRecord, IdentityKey};
use std::collections::HashMap;

/// Survivors plus the number of records collapsed away
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub records: Vec<ConsentRecord>,
    pub discarded: usize,
}

/// Collapses records sharing an identity key, keeping the last one
pub fn deduplicate(records: Vec<ConsentRecord>) -> DedupOutcome {
    let total = records.len();

    let mut last_seen: HashMap<IdentityKey, usize> = HashMap::with_capacity(total);
    for (position, record) in records.iter().enumerate() {
        last_seen.insert(record.identity_key(), position);
    }

    let survivors: Vec<ConsentRecord> = records
        .into_iter()
        .enumerate()
        .filter(|(position, record)| last_seen.get(&record.identity_key()) == Some(position))
        .map(|(_, record)| record)
        .collect();

    let discarded = total - survivors.len();
    if discarded > 0 {
        tracing::debug!(discarded, kept = survivors.len(), "Duplicate consents collapsed");
    }

    DedupOutcome {
        records: survivors,
        discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApprovalStatus, Recipient, RecipientType};
    use chrono::NaiveDate;

    fn record(row: usize, recipient: &str, consent_type: &str, hour: u32) -> ConsentRecord {
        ConsentRecord {
            row,
            recipient: Recipient::normalize(recipient).unwrap(),
            consent_type: consent_type.to_string(),
            source: "HS_WEB".to_string(),
            approval_status: ApprovalStatus::Granted,
            consent_date: NaiveDate::from_ymd_opt(2025, 6, 20)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            recipient_type: RecipientType::Individual,
        }
    }

    #[test]
    fn test_last_occurrence_wins() {
        let outcome = deduplicate(vec![
            record(1, "5459419845", "MESAJ", 14),
            record(2, "5459419845", "MESAJ", 15),
            record(3, "5467338892", "ARAMA", 14),
        ]);

        assert_eq!(outcome.discarded, 1);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].row, 2);
        assert_eq!(outcome.records[0].consent_date_text(), "2025-06-20 15:00:00");
        assert_eq!(outcome.records[1].row, 3);
    }

    #[test]
    fn test_order_follows_last_appearance() {
        let outcome = deduplicate(vec![
            record(1, "5459419845", "MESAJ", 10),
            record(2, "5467338892", "ARAMA", 10),
            record(3, "5459419845", "MESAJ", 11),
        ]);

        let rows: Vec<usize> = outcome.records.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 3]);
    }

    #[test]
    fn test_same_recipient_different_type_kept() {
        let outcome = deduplicate(vec![
            record(1, "5459419845", "MESAJ", 10),
            record(2, "05459419845", "ARAMA", 10),
        ]);

        assert_eq!(outcome.discarded, 0);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_equivalent_phone_spellings_collapse() {
        let outcome = deduplicate(vec![
            record(1, "05459419845", "MESAJ", 10),
            record(2, "+90 545 941 98 45", "MESAJ", 11),
        ]);

        assert_eq!(outcome.discarded, 1);
        assert_eq!(outcome.records[0].row, 2);
    }

    #[test]
    fn test_empty_input() {
        let outcome = deduplicate(Vec::new());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.discarded, 0);
    }
}
