//! Input ingestion
//!
//! Reads the raw table and normalizes its rows into [`ConsentRecord`]s.
//!
//! [`ConsentRecord`]: crate::domain::ConsentRecord

pub mod normalize;
pub mod table;

pub use normalize::{
    normalize_all, normalize_record, parse_consent_timestamp, DropReason, DroppedRow,
    NormalizeOutcome, Normalized, INPUT_TIMESTAMP_FORMAT,
};
pub use table::{RawRecord, RawTable, REQUIRED_COLUMNS};
