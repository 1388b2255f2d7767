//! sync-provision library
//!
//! Provisions a database-to-warehouse replication pipeline on a
//! data-integration platform by driving its REST API through one linear
//! sequence of idempotent steps:
//!
//! 1. Create the source connector and validate it
//! 2. Create the destination connector and validate it
//! 3. Discover the source schema and build a filtered sync catalog
//! 4. Create the connection binding source, destination, schedule, and catalog
//!
//! The run is non-resumable and halts on the first failure; already-created
//! remote resources are not rolled back.
//!
//! # Modules
//!
//! - [`config`] - typed YAML configuration documents
//! - [`catalog`] - sync catalog construction from discovery results
//! - [`provision`] - the provisioning sequence itself
//!
//! The REST client lives in the `platform-client` crate.

use clap::Parser;
use platform_client::{ApiError, PlatformClient};
use std::time::Duration;

pub mod catalog;
pub mod config;
pub mod provision;

pub use provision::{run_provision, ProvisionedPipeline};

#[derive(Parser, Clone)]
pub struct PlatformOpts {
    /// Platform API base URL
    #[arg(
        long,
        default_value = "https://api.platform.dev/v1",
        env = "PLATFORM_API_URL"
    )]
    pub api_url: String,

    /// Platform API bearer token
    #[arg(long, env = "PLATFORM_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Platform workspace id
    #[arg(long, env = "PLATFORM_WORKSPACE_ID")]
    pub workspace_id: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "60")]
    pub request_timeout_secs: u64,
}

impl PlatformOpts {
    /// Build the API client these options describe.
    pub fn client(&self) -> Result<PlatformClient, ApiError> {
        PlatformClient::new(
            &self.api_url,
            &self.api_token,
            &self.workspace_id,
            Duration::from_secs(self.request_timeout_secs),
        )
    }
}
