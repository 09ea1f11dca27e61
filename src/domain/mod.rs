//! Domain models and types.
//!
//! This module contains the core domain models, types, and error hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Recipient`], [`RequestId`])
//! - **Consent model** ([`ConsentRecord`], [`ApprovalStatus`], [`IdentityKey`])
//! - **Error types** ([`IysError`], [`RegistryError`])
//! - **Result type alias** ([`Result`])
//!
//! # Canonical recipients
//!
//! Phone numbers are normalized once, when a [`Recipient`] is built, and the
//! normalization is idempotent:
//!
//! ```rust
//! use iys_bulk::domain::Recipient;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recipient = Recipient::normalize("0545 941 98 45")?;
//! assert_eq!(recipient.as_str(), "+905459419845");
//! # Ok(())
//! # }
//! ```

pub mod consent;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use consent::{ApprovalStatus, ConsentRecord, IdentityKey, RecipientType, CONSENT_DATE_FORMAT};
pub use errors::{IysError, RegistryError};
pub use ids::{Recipient, RequestId};
pub use result::Result;
