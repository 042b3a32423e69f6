pub mod address;
pub mod classify;
pub mod condition;
pub mod config;
pub mod connector;
pub mod error;
pub mod external;
pub mod meta;
pub mod reconciler;
pub mod resource;
pub mod status;
pub mod store;

pub use error::{ProviderError, Result};
