//! Temporary nickname login.

use crate::{AuthApiClient, AuthResult, LoginAdapter, LoginMethod, Nickname};
use async_trait::async_trait;
use serde::Serialize;
use shell_storage::TokenPair;

pub const TEMP_LOGIN_PATH: &str = "/api/auth/temp/login";

#[derive(Debug, Serialize)]
struct TempLoginRequest<'a> {
    nickname: &'a str,
}

/// Logs in with a user-chosen nickname. No account is required.
#[derive(Clone, Debug)]
pub struct TempLoginAdapter {
    client: AuthApiClient,
}

impl TempLoginAdapter {
    pub fn new(client: AuthApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LoginAdapter for TempLoginAdapter {
    /// Raw nickname as typed.
    type Payload = String;

    fn method(&self) -> LoginMethod {
        LoginMethod::Temporary
    }

    async fn login(&self, payload: String) -> AuthResult<TokenPair> {
        let nickname = Nickname::parse(&payload)?;

        let request = TempLoginRequest {
            nickname: nickname.as_str(),
        };
        let tokens = self
            .client
            .post_for_tokens("temp login", TEMP_LOGIN_PATH, &request)
            .await?;

        tracing::info!(nickname = %nickname, "Temporary login succeeded");
        Ok(tokens)
    }
}
