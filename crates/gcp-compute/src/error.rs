use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("googleapi: Error {code}: {message}")]
    Api { code: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response body: {source}\n  body: {body}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ComputeError {
    /// HTTP status of the failed call, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ComputeError::Api { code, .. } => Some(*code),
            ComputeError::Http(e) => e.status().map(|s| s.as_u16()),
            ComputeError::Decode { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    /// True for failures that never reached a server response: connect
    /// errors, timeouts, broken bodies.
    pub fn is_transport(&self) -> bool {
        matches!(self, ComputeError::Http(e) if e.status().is_none())
    }

    /// Build an [`ComputeError::Api`] from a non-2xx response body.
    ///
    /// Google APIs wrap failures as `{"error": {"code": 409, "message": ".."}}`.
    /// Anything else (empty body, HTML from a proxy) is kept verbatim.
    pub(crate) fn from_response(code: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|env| env.error)
            .map(|detail| detail.message)
            .unwrap_or_else(|| body.trim().to_string());
        ComputeError::Api { code, message }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}
