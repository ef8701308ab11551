//! Login error types.

use thiserror::Error;

/// Message shown for any failed login that is not a validation problem.
pub const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please try again.";

/// Client-side nickname validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a nickname.")]
    EmptyNickname,

    #[error("Nickname must be at least {min} characters.")]
    NicknameTooShort { min: usize },

    #[error("Nickname must be at most {max} characters.")]
    NicknameTooLong { max: usize },
}

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Rejected locally, nothing was sent
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Backend answered with a non-success status
    #[error("{operation} rejected with status {status} ({body_summary})")]
    Rejected {
        operation: &'static str,
        status: u16,
        body_summary: String,
    },

    /// Success status but the body is not a usable token pair
    #[error("Malformed auth response: {0}")]
    MalformedResponse(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl AuthError {
    /// Text safe to show the user.
    ///
    /// Validation problems explain themselves; everything else collapses to
    /// one generic message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(e) => e.to_string(),
            _ => GENERIC_LOGIN_FAILURE.to_string(),
        }
    }

    /// Returns true if retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                e.status().is_some_and(|status| status.is_server_error())
            }
            AuthError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
