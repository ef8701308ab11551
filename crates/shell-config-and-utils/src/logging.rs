//! Logging initialization for the shell.

use crate::Paths;
use observability::LogConfig;

/// Service name written into every JSON log line.
const SERVICE_NAME: &str = "go2go-shell";

/// Initialize structured logging for the shell.
///
/// JSONL goes to `<base>/logs/shell.jsonl`, compact logs to stderr. `RUST_LOG`
/// overrides `level`.
pub fn init_logging(level: &str, paths: &Paths) {
    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        also_stderr: true,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
