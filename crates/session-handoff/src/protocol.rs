//! Wire vocabulary between the shell and the embedded page.

use serde::{Deserialize, Serialize};

/// A message posted by the page to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMessage {
    /// Readiness probe (or the page itself) reports it can take tokens.
    WebviewReady,
    TokenSavedSuccess,
    TokenAlreadyExists,
    TokenSavedError,
    TokenSavedCriticalError,
    TokensCleared,
    /// Client-side router failed after a navigation.
    RouterError {
        error: Option<String>,
        path: Option<String>,
    },
    /// Anything else; logged and ignored.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct StructuredMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    path: Option<String>,
}

impl PageMessage {
    pub const WEBVIEW_READY: &'static str = "WEBVIEW_READY";
    pub const TOKEN_SAVED_SUCCESS: &'static str = "TOKEN_SAVED_SUCCESS";
    pub const TOKEN_ALREADY_EXISTS: &'static str = "TOKEN_ALREADY_EXISTS";
    pub const TOKEN_SAVED_ERROR: &'static str = "TOKEN_SAVED_ERROR";
    pub const TOKEN_SAVED_CRITICAL_ERROR: &'static str = "TOKEN_SAVED_CRITICAL_ERROR";
    pub const TOKENS_CLEARED: &'static str = "TOKENS_CLEARED";
    pub const ROUTER_ERROR: &'static str = "ROUTER_ERROR";

    /// Parse a raw page message. Never fails; unrecognised input becomes
    /// [`PageMessage::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            Self::WEBVIEW_READY => return PageMessage::WebviewReady,
            Self::TOKEN_SAVED_SUCCESS => return PageMessage::TokenSavedSuccess,
            Self::TOKEN_ALREADY_EXISTS => return PageMessage::TokenAlreadyExists,
            Self::TOKEN_SAVED_ERROR => return PageMessage::TokenSavedError,
            Self::TOKEN_SAVED_CRITICAL_ERROR => return PageMessage::TokenSavedCriticalError,
            Self::TOKENS_CLEARED => return PageMessage::TokensCleared,
            _ => {}
        }

        if trimmed.starts_with('{') {
            if let Ok(message) = serde_json::from_str::<StructuredMessage>(trimmed) {
                if message.kind == Self::ROUTER_ERROR {
                    return PageMessage::RouterError {
                        error: message.error.map(|value| match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        }),
                        path: message.path,
                    };
                }
            }
        }

        PageMessage::Unknown(raw.to_string())
    }
}

/// Something the shell asks the host WebView to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
pub enum PageCommand {
    /// Deliver a string to the page's message inbox.
    PostMessage(String),
    /// Evaluate a script in the page.
    InjectScript(String),
    /// Reload the page.
    Reload,
}
