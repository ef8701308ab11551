//! Handoff error types.

use login_adapters::AuthError;
use thiserror::Error;

/// Message shown when a login succeeded remotely but could not be stored.
pub const PERSISTENCE_FAILURE: &str = "Could not save your session. Please try again.";

#[derive(Error, Debug)]
pub enum HandoffError {
    /// Login adapter failed; session state is unchanged
    #[error(transparent)]
    Login(#[from] AuthError),

    /// Tokens could not be persisted, so the login was not applied
    #[error("Failed to persist session")]
    Persistence,

    /// The session changed (logout) while the login was in flight
    #[error("Login result discarded: session changed while it was in flight")]
    StaleLogin,

    /// Controller rejected the event in its current state
    #[error("Event rejected: {0}")]
    Rejected(String),

    /// Host page channel failed
    #[error("Page channel error: {0}")]
    Page(String),
}

impl HandoffError {
    /// Text safe to show the user.
    pub fn user_message(&self) -> String {
        match self {
            HandoffError::Login(e) => e.user_message(),
            HandoffError::Persistence => PERSISTENCE_FAILURE.to_string(),
            _ => login_adapters::GENERIC_LOGIN_FAILURE.to_string(),
        }
    }
}

pub type HandoffResult<T> = Result<T, HandoffError>;
