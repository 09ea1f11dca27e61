//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through an upload: the
//! canonical phone number of a consent recipient and the tracking identifier
//! the registry hands back for a submitted batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Country calling code prepended to bare Turkish subscriber numbers
const COUNTRY_CODE: &str = "90";

/// Length of a subscriber number without country code or trunk prefix
const SUBSCRIBER_DIGITS: usize = 10;

/// Canonical E.164 recipient phone number
///
/// Always starts with `+`. Construction goes through [`Recipient::normalize`],
/// which is idempotent: normalizing an already normalized value returns it
/// unchanged, so the same raw cell always yields the same recipient wherever
/// it is read.
///
/// # Examples
///
/// ```
/// use iys_bulk::domain::ids::Recipient;
///
/// let recipient = Recipient::normalize("545 941 98 45").unwrap();
/// assert_eq!(recipient.as_str(), "+905459419845");
///
/// let again = Recipient::normalize(recipient.as_str()).unwrap();
/// assert_eq!(again, recipient);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Recipient(String);

impl Recipient {
    /// Normalizes a raw phone cell into its canonical form
    ///
    /// Rules, in order:
    /// - a numeric cell with a zero fraction (`5459419845.0`) loses the fraction
    /// - every non-digit character is removed
    /// - a cell written with a leading `+` already carries its country code
    ///   and keeps it
    /// - 12 digits starting with `90` get a leading `+`
    /// - 10 digits get `+90`
    /// - 11 digits starting with the trunk `0` get `+9` (`0545…` becomes `+90545…`)
    /// - anything else gets a leading `+`
    ///
    /// # Errors
    ///
    /// Returns `Err` when the cell contains no digits at all.
    pub fn normalize(raw: &str) -> Result<Self, String> {
        let cell = strip_zero_fraction(raw.trim());
        let digits: String = cell.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.is_empty() {
            return Err(format!("Recipient '{raw}' contains no digits"));
        }

        let canonical = if cell.starts_with('+') {
            format!("+{digits}")
        } else if digits.len() == SUBSCRIBER_DIGITS + 2 && digits.starts_with(COUNTRY_CODE) {
            format!("+{digits}")
        } else if digits.len() == SUBSCRIBER_DIGITS {
            format!("+{COUNTRY_CODE}{digits}")
        } else if digits.len() == SUBSCRIBER_DIGITS + 1 && digits.starts_with('0') {
            format!("+9{digits}")
        } else {
            format!("+{digits}")
        };

        Ok(Self(canonical))
    }

    /// Returns the recipient as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Drops a `.000` style suffix from a cell that is otherwise a plain number
fn strip_zero_fraction(cell: &str) -> &str {
    match cell.rsplit_once('.') {
        Some((number, fraction))
            if !number.is_empty()
                && !fraction.is_empty()
                && fraction.chars().all(|c| c == '0')
                && number
                    .trim_start_matches('+')
                    .chars()
                    .all(|c| c.is_ascii_digit()) =>
        {
            number
        }
        _ => cell,
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Recipient {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for Recipient {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<Recipient> for String {
    fn from(recipient: Recipient) -> Self {
        recipient.0
    }
}

impl AsRef<str> for Recipient {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tracking identifier returned by the registry for a submitted batch
///
/// # Examples
///
/// ```
/// use iys_bulk::domain::ids::RequestId;
///
/// let id = RequestId::new("1f0e6c2a-request").unwrap();
/// assert_eq!(id.as_str(), "1f0e6c2a-request");
/// assert!(RequestId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a new RequestId
    ///
    /// # Errors
    ///
    /// Returns `Err` if the identifier is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Request ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the request ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
