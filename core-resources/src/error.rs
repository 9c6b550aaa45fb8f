use bridge_traits::error::BridgeError;
use bridge_traits::http::HttpResponse;
use thiserror::Error;

/// Failure of a single resource request.
///
/// The resource layer never interprets these; it passes them to the caller
/// unchanged after settling its busy flag.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// No response arrived (connection refused, DNS, TLS, timeout)
    #[error("Transport failure: {0}")]
    Transport(#[from] BridgeError),

    /// 4xx response
    #[error("Client error (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Client { status: u16, message: Option<String> },

    /// 5xx response
    #[error("Server error (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    /// Any other non-2xx response (1xx, 3xx)
    #[error("Unexpected status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    UnexpectedStatus { status: u16, message: Option<String> },

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request payload or query could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl ResourceError {
    /// Build the error for a non-2xx response.
    pub fn from_response(response: &HttpResponse) -> Self {
        let status = response.status;
        let message = server_message(&response.body);

        match status {
            400..=499 => ResourceError::Client { status, message },
            500..=599 => ResourceError::Server { status, message },
            _ => ResourceError::UnexpectedStatus { status, message },
        }
    }

    /// HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResourceError::Client { status, .. }
            | ResourceError::Server { status, .. }
            | ResourceError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the server, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ResourceError::Client { message, .. }
            | ResourceError::Server { message, .. }
            | ResourceError::UnexpectedStatus { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ResourceError::Transport(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;

/// Extract a human-readable message from an error body.
///
/// JSON bodies are searched for `message`, `error` and `detail` in that
/// order; anything else falls back to the trimmed text.
fn server_message(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return Some(text.trim().to_string());
                }
            }
        }
        if let Some(text) = value.as_str() {
            return non_empty(text);
        }
        return None;
    }

    non_empty(&String::from_utf8_lossy(body))
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
