//! External system integrations.
//!
//! - [`iys`] - IYS consent registry (token exchange, consent requests, status checks)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the pipeline can
//! be exercised with scripted implementations:
//!
//! ```rust,no_run
//! use iys_bulk::adapters::iys::{IysClient, RegistryClient};
//! use iys_bulk::config::{secret_string, RegistryConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RegistryConfig {
//!     iys_code: "710271".to_string(),
//!     brand_code: "710271".to_string(),
//!     username: Some("user".to_string()),
//!     password: Some(secret_string("pass".to_string())),
//!     ..Default::default()
//! };
//!
//! let client = IysClient::new(config)?;
//! client.authenticate().await?;
//! # Ok(())
//! # }
//! ```

pub mod iys;
