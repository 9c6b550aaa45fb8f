use core_auth::AuthError;
use core_resources::ResourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocialError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

impl SocialError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        SocialError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SocialError::Resource(e) => e.status(),
            SocialError::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SocialError>;
