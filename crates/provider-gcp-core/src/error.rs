use gcp_compute::ComputeError;
use thiserror::Error;

use crate::classify::{self, ApiCall, Outcome};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("managed resource is not a {expected} custom resource (got {actual})")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("cannot get GCP Address '{name}': {source}")]
    GetFailed {
        name: String,
        #[source]
        source: ComputeError,
    },

    #[error("cannot create GCP Address '{name}': {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: ComputeError,
    },

    #[error("cannot delete GCP Address '{name}': {source}")]
    DeleteFailed {
        name: String,
        #[source]
        source: ComputeError,
    },

    #[error("cannot resolve credentials: {0}")]
    Credentials(String),

    #[error("cannot create compute client: {0}")]
    Connect(#[source] ComputeError),

    #[error("invalid provider config: {0}")]
    InvalidConfig(String),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("record already exists: {0}")]
    RecordExists(String),

    #[error("invalid record name '{0}': must be a plain file name")]
    InvalidRecordName(String),

    #[error("record '{name}' was modified concurrently: stored version {stored}, update based on {given}")]
    Conflict { name: String, stored: u64, given: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ProviderError {
    /// Whether re-invoking the same operation later can succeed.
    ///
    /// Wrapped API errors defer to the classifier; store conflicts are
    /// retryable after a fresh read; everything else needs a human.
    pub fn is_retryable(&self) -> bool {
        fn classified(call: ApiCall, source: &ComputeError) -> bool {
            classify::classify(call, source) == Outcome::Recoverable
        }
        match self {
            ProviderError::GetFailed { source, .. } => classified(ApiCall::Get, source),
            ProviderError::CreateFailed { source, .. } => classified(ApiCall::Insert, source),
            ProviderError::DeleteFailed { source, .. } => classified(ApiCall::Delete, source),
            ProviderError::Connect(source) => source.is_transport(),
            ProviderError::Conflict { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
