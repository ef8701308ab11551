//! Apple identity login.

use crate::{AuthApiClient, AuthResult, LoginAdapter, LoginMethod};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shell_storage::TokenPair;

pub const APPLE_LOGIN_PATH: &str = "/api/auth/apple/login";

/// What the Apple provider handed back. Any field may be missing: Apple
/// only shares profile details on the first authorization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppleCredential {
    pub authorization_code: Option<String>,
    pub identity_token: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Echoed back to the backend; a fresh one is generated when absent.
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
struct AppleLoginRequest {
    state: String,
    code: String,
    id_token: String,
    user: AppleUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppleUser {
    email: String,
    first_name: String,
    last_name: String,
}

impl From<AppleCredential> for AppleLoginRequest {
    fn from(credential: AppleCredential) -> Self {
        Self {
            state: credential
                .state
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            code: credential.authorization_code.unwrap_or_default(),
            id_token: credential.identity_token.unwrap_or_default(),
            user: AppleUser {
                email: credential.email.unwrap_or_default(),
                first_name: credential.given_name.unwrap_or_default(),
                last_name: credential.family_name.unwrap_or_default(),
            },
        }
    }
}

/// Exchanges an Apple credential for a go2go token pair.
#[derive(Clone, Debug)]
pub struct AppleLoginAdapter {
    client: AuthApiClient,
}

impl AppleLoginAdapter {
    pub fn new(client: AuthApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LoginAdapter for AppleLoginAdapter {
    type Payload = AppleCredential;

    fn method(&self) -> LoginMethod {
        LoginMethod::Apple
    }

    async fn login(&self, payload: AppleCredential) -> AuthResult<TokenPair> {
        if payload.authorization_code.is_none() || payload.identity_token.is_none() {
            // Sent anyway; the backend decides.
            tracing::warn!("Apple credential is missing code or identity token");
        }

        let request = AppleLoginRequest::from(payload);
        let tokens = self
            .client
            .post_for_tokens("apple login", APPLE_LOGIN_PATH, &request)
            .await?;

        tracing::info!("Apple login succeeded");
        Ok(tokens)
    }
}
