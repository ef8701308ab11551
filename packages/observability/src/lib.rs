//! # Observability
//!
//! Centralized logging for the go2go shell.
//!
//! Binaries call `observability::init()` once at startup and use the
//! standard `tracing` macros everywhere else. Library crates never install a
//! subscriber themselves.
//!
//! When a log path is configured, every event is written as one JSON line
//! to that file (`tail -f ~/.go2go/logs/shell.jsonl | jq`). Credential-like
//! fields are redacted before they reach the file, so access and refresh
//! tokens never land on disk through logging.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "go2go-shell".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("shell started");
//! }
//! ```

mod file_writer;
mod json_layer;
mod redact;

use std::path::PathBuf;

pub use redact::{redact_fields, REDACTED};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "go2go-shell", "bridge").
    /// Included in every JSON log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// JSONL log file. When `None`, only the stderr layer is installed.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Default JSONL log location (`~/.go2go/logs/shell.jsonl`).
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".go2go").join("logs").join("shell.jsonl"))
}

/// Initialize logging with default settings and the given service name.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        log_path: default_log_path(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Installing a subscriber twice is a no-op; the first one wins.
pub fn init_with_config(config: LogConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer};

    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_level))
    };

    let json_layer = config.log_path.as_ref().and_then(|path| {
        match file_writer::FileLogWriter::new(path) {
            Ok(writer) => Some(
                json_layer::JsonLayer::new(
                    config.service_name.clone(),
                    file_writer::WriterFactory::new(writer),
                )
                .with_filter(env_filter()),
            ),
            Err(e) => {
                eprintln!("failed to open log file {}: {e}", path.display());
                None
            }
        }
    });

    // Without a file there is nowhere else to log, so stderr becomes mandatory.
    let stderr_layer = (config.also_stderr || json_layer.is_none()).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(env_filter())
    });

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            service = %config.service_name,
            log_path = ?config.log_path,
            "observability initialized"
        );
    }
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
