//! Core configuration and utilities for the go2go shell.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DeliveryMode, DEFAULT_API_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_WEB_APP_URL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
