//! IYS consent registry adapter
//!
//! - [`traits`] - The [`RegistryClient`] seam used by the upload pipeline
//! - [`client`] - reqwest implementation with password-grant authentication
//! - [`models`] - Request and response wire types

pub mod client;
pub mod models;
pub mod traits;

pub use client::IysClient;
pub use models::{
    describe_error, ConsentPayload, RequestSummary, StatusResponse, SubRequestStatus,
};
pub use traits::RegistryClient;
