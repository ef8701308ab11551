//! Login adapters for the go2go shell.
//!
//! Each adapter turns one kind of user action into a [`TokenPair`] by calling
//! the auth backend:
//!
//! - [`AppleLoginAdapter`]: Apple identity credential, `POST /api/auth/apple/login`
//! - [`TempLoginAdapter`]: user-chosen nickname, `POST /api/auth/temp/login`
//!
//! Both share an [`AuthApiClient`] and fail with [`AuthError`]. Nickname
//! validation happens before any network call.

mod apple;
mod client;
mod error;
mod nickname;
mod temp;

pub use apple::{AppleCredential, AppleLoginAdapter, APPLE_LOGIN_PATH};
pub use client::AuthApiClient;
pub use error::{AuthError, AuthResult, ValidationError, GENERIC_LOGIN_FAILURE};
pub use nickname::{Nickname, NICKNAME_MAX_CHARS, NICKNAME_MIN_CHARS};
pub use shell_storage::TokenPair;
pub use temp::{TempLoginAdapter, TEMP_LOGIN_PATH};

use async_trait::async_trait;
use std::fmt;

/// Which login flow produced a token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    Apple,
    Temporary,
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginMethod::Apple => write!(f, "apple"),
            LoginMethod::Temporary => write!(f, "temporary"),
        }
    }
}

/// A strategy that produces a [`TokenPair`] from one kind of user action.
///
/// Callers past this point treat every adapter the same way.
#[async_trait]
pub trait LoginAdapter: Send + Sync {
    /// What the user action hands the adapter.
    type Payload: Send + 'static;

    fn method(&self) -> LoginMethod;

    async fn login(&self, payload: Self::Payload) -> AuthResult<TokenPair>;
}
