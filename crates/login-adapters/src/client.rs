//! Shared HTTP client for the auth endpoints.

use crate::{AuthError, AuthResult};
use serde::Serialize;
use shell_storage::TokenPair;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use url::Url;

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Client for the `/api/auth/*` endpoints of the go2go backend.
#[derive(Clone, Debug)]
pub struct AuthApiClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl AuthApiClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// A path prefix on `base_url` is kept: endpoints resolve below it.
    pub fn with_http_client(mut base_url: Url, http_client: reqwest::Client) -> Self {
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }
        Self {
            http_client,
            base_url,
        }
    }

    /// Parse `base_url` and build a client for it.
    pub fn parse(base_url: &str) -> AuthResult<Self> {
        Ok(Self::new(Url::parse(base_url)?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `body` as JSON to `path` and read a token pair from the reply.
    ///
    /// Response bodies are never logged, only their length and digest.
    pub(crate) async fn post_for_tokens<B>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> AuthResult<TokenPair>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.base_url.join(path.trim_start_matches('/'))?;

        tracing::debug!(operation, url = %url, "Sending auth request");

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body_summary = summarize_response_body(&text);
            tracing::warn!(
                operation,
                status = status.as_u16(),
                body_summary = %body_summary,
                "Auth request rejected"
            );
            return Err(AuthError::Rejected {
                operation,
                status: status.as_u16(),
                body_summary,
            });
        }

        let tokens: TokenPair = serde_json::from_str(&text).map_err(|e| {
            AuthError::MalformedResponse(format!(
                "{e} ({})",
                summarize_response_body(&text)
            ))
        })?;

        if !tokens.is_valid() {
            return Err(AuthError::MalformedResponse(
                "empty accessToken or refreshToken".to_string(),
            ));
        }

        Ok(tokens)
    }
}
