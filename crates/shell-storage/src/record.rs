//! Token pair record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access/refresh credential pair issued by the auth backend.
///
/// Serializes with the backend's camelCase field names
/// (`{"accessToken": .., "refreshToken": ..}`), which is also the shape the
/// embedded page expects.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Both fields present and non-empty.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

// Tokens must never reach logs through `{:?}`.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &format_args!("<{} chars>", self.access_token.len()))
            .field("refresh_token", &format_args!("<{} chars>", self.refresh_token.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_requires_both_fields() {
        assert!(TokenPair::new("a", "r").is_valid());
        assert!(!TokenPair::new("", "r").is_valid());
        assert!(!TokenPair::new("a", "").is_valid());
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let json = serde_json::to_string(&TokenPair::new("acc", "ref")).unwrap();
        assert_eq!(json, r#"{"accessToken":"acc","refreshToken":"ref"}"#);
    }

    #[test]
    fn debug_output_hides_token_values() {
        let debug = format!("{:?}", TokenPair::new("super-secret", "other-secret"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("other-secret"));
        assert!(debug.contains("<12 chars>"));
    }
}
