//! Registry client trait
//!
//! The upload pipeline talks to the registry only through [`RegistryClient`],
//! so tests can drive it with scripted responses and no network.

use super::models::StatusResponse;
use crate::domain::{ConsentRecord, RequestId, Result};
use async_trait::async_trait;

/// Operations the pipeline needs from the consent registry
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Exchange the configured credentials for a bearer token and cache it
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AuthenticationFailed` carrying the registry's
    /// error detail when the exchange fails.
    async fn authenticate(&self) -> Result<()>;

    /// Submit one batch of consents and return the request's tracking id
    ///
    /// Authenticates first when no token is cached.
    async fn submit(&self, records: &[ConsentRecord]) -> Result<RequestId>;

    /// Fetch the current per-consent status of a submitted request
    async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusResponse>;

    /// Base URL of the registry, for logging
    fn base_url(&self) -> &str;
}
