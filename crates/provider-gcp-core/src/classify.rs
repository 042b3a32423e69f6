use gcp_compute::ComputeError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ApiCall
// ---------------------------------------------------------------------------

/// The backend call whose failure is being classified. The same status code
/// means different things depending on what was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiCall {
    Get,
    Insert,
    Delete,
}

impl ApiCall {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiCall::Get => "get",
            ApiCall::Insert => "insert",
            ApiCall::Delete => "delete",
        }
    }
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The failure says the goal state already holds (absent object on
    /// get or delete). Not an error.
    GoalReached,
    /// Worth retrying unchanged on the caller's backoff.
    Recoverable,
    /// Retrying the same request will keep failing.
    Fatal,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Map a failed backend call to an [`Outcome`].
///
/// | status            | get          | insert      | delete       |
/// |-------------------|--------------|-------------|--------------|
/// | 404               | GoalReached  | Fatal       | GoalReached  |
/// | 409               | Fatal        | Fatal       | Fatal        |
/// | 408, 429, 5xx     | Recoverable  | Recoverable | Recoverable  |
/// | other 4xx         | Fatal        | Fatal       | Fatal        |
/// | no response       | Recoverable  | Recoverable | Recoverable  |
/// | undecodable body  | Fatal        | Fatal       | Fatal        |
///
/// A 409 on insert is a naming collision with an object this controller
/// does not own, so it is never folded into success.
pub fn classify(call: ApiCall, err: &ComputeError) -> Outcome {
    match err.status_code() {
        Some(404) if matches!(call, ApiCall::Get | ApiCall::Delete) => Outcome::GoalReached,
        Some(408) | Some(429) => Outcome::Recoverable,
        Some(code) if code >= 500 => Outcome::Recoverable,
        Some(_) => Outcome::Fatal,
        None if err.is_transport() => Outcome::Recoverable,
        None => Outcome::Fatal,
    }
}
