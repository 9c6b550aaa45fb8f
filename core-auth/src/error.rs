use core_resources::ResourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username or email already taken")]
    UsernameTaken,

    #[error("Request rejected (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl AuthError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AuthError::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

impl From<ResourceError> for AuthError {
    fn from(error: ResourceError) -> Self {
        match error {
            ResourceError::Transport(e) => AuthError::Transport(e.to_string()),
            ResourceError::Decode(msg) | ResourceError::Encode(msg) => {
                AuthError::Serialization(msg)
            }
            ResourceError::Client { status, message }
            | ResourceError::Server { status, message }
            | ResourceError::UnexpectedStatus { status, message } => {
                AuthError::Rejected { status, message }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
