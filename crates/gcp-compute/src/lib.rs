//! `gcp-compute`: a small typed client for the Compute Engine REST API.
//!
//! Only the surface the address controller needs is covered: regional
//! addresses can be fetched, inserted and deleted. Every failure keeps the
//! HTTP status of the response so callers can decide whether the outcome is
//! "already done" (404 on delete) or a real error.
//!
//! # Architecture
//!
//! ```text
//! ClientOptions
//!     │
//!     ▼
//! ComputeClient   ← reqwest::Client + endpoint + project + bearer token
//!     │
//!     ▼
//! Addresses       ← get / insert / delete under projects/{p}/regions/{r}
//!     │
//!     ▼
//! Address / Operation / ComputeError
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use gcp_compute::{ClientOptions, ComputeClient};
//!
//! let client = ComputeClient::new(ClientOptions {
//!     project: "my-project".into(),
//!     access_token: Some(token),
//!     ..Default::default()
//! })?;
//!
//! match client.addresses().get("us-central1", "my-address").await {
//!     Ok(addr) => println!("{}", addr.status.unwrap_or_default()),
//!     Err(e) if e.is_not_found() => println!("not created yet"),
//!     Err(e) => return Err(e),
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{Addresses, ClientOptions, ComputeClient, DEFAULT_ENDPOINT};
pub use error::ComputeError;
pub use types::{Address, Operation, OperationError, OperationErrorItem};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ComputeError>;
