//! Typed client for the data-integration platform REST API.
//!
//! The platform hosts source connectors, destination connectors, and the
//! connections that replicate data between them. This crate wraps the
//! handful of REST operations a provisioning run needs:
//!
//! - create and validate a source
//! - create and validate a destination
//! - discover the schema a source exposes
//! - create and fetch a connection
//!
//! Every endpoint has an explicit request/response record in [`types`], so a
//! response that does not match the documented shape is a decode error
//! rather than a missing-key surprise. All failures collapse into
//! [`ApiError`]; a validation check that the platform itself reports as
//! failed is a normal `false` result, not an error.
//!
//! No retries are performed. A single failed call aborts the operation.

pub mod client;
pub mod error;
pub mod types;

pub use client::{PlatformClient, DEFAULT_TIMEOUT};
pub use error::ApiError;
