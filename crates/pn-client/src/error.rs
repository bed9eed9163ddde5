//! Transport error types.

use serde_json::Value;

/// Shown when a failed response carries no readable JSON body.
pub const GENERIC_ERROR_DETAIL: &str = "Unknown error occurred";

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. Displays the server's detail text as-is.
    #[error("{detail}")]
    Status { status: u16, detail: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

/// Message for a failed response: the generic text when the body is not
/// JSON, otherwise its `detail` when present and `HTTP <status>` when not.
pub fn error_detail(status: u16, body: &str) -> String {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => return GENERIC_ERROR_DETAIL.to_string(),
    };
    match parsed.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => format!("HTTP {status}"),
        // FastAPI validation failures send a list of issues
        Some(other) => other.to_string(),
    }
}
