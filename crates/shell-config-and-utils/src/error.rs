//! Errors raised while loading configuration or resolving paths.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A config value is missing or out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Web app or API URL did not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// `config.json` could not be read or written
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// `config.json` is not valid JSON
    #[error("Config file is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// Base directory could not be determined
    #[error("Path error: {0}")]
    Path(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
