//! Configuration management for the shell.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Embedded web application loaded into the WebView.
pub const DEFAULT_WEB_APP_URL: &str = "https://go2go-front.pages.dev/";

/// Backend hosting the `/api/auth/*` endpoints.
pub const DEFAULT_API_BASE_URL: &str = "https://munchi.site";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_READINESS_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_READINESS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_RESEND_DELAY_MS: u64 = 1_000;
const DEFAULT_SPLASH_MIN_DISPLAY_MS: u64 = 1_500;

/// Which page channels carry a token delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Post a message and inject the storage-write script.
    #[default]
    Dual,
    /// Post the JSON message only.
    Message,
    /// Inject the storage-write script only.
    Script,
}

impl DeliveryMode {
    pub fn posts_message(self) -> bool {
        matches!(self, DeliveryMode::Dual | DeliveryMode::Message)
    }

    pub fn injects_script(self) -> bool {
        matches!(self, DeliveryMode::Dual | DeliveryMode::Script)
    }
}

impl FromStr for DeliveryMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dual" => Ok(DeliveryMode::Dual),
            "message" => Ok(DeliveryMode::Message),
            "script" => Ok(DeliveryMode::Script),
            other => Err(CoreError::Config(format!("unknown delivery mode: {other}"))),
        }
    }
}

/// Main shell configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// URL of the embedded web application.
    #[serde(default = "default_web_app_url")]
    pub web_app_url: String,
    /// Base URL of the auth backend.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Interval between readiness probe re-checks.
    #[serde(default = "default_readiness_poll_interval_ms")]
    pub readiness_poll_interval_ms: u64,
    /// Probe re-checks before the page is declared stalled.
    #[serde(default = "default_readiness_max_attempts")]
    pub readiness_max_attempts: u32,
    /// Delay before the single re-send after a page router error.
    #[serde(default = "default_resend_delay_ms")]
    pub resend_delay_ms: u64,
    /// Minimum time the splash screen stays visible.
    #[serde(default = "default_splash_min_display_ms")]
    pub splash_min_display_ms: u64,
    /// Delivery channels.
    #[serde(default)]
    pub delivery_mode: DeliveryMode,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_web_app_url() -> String {
    DEFAULT_WEB_APP_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_readiness_poll_interval_ms() -> u64 {
    DEFAULT_READINESS_POLL_INTERVAL_MS
}

fn default_readiness_max_attempts() -> u32 {
    DEFAULT_READINESS_MAX_ATTEMPTS
}

fn default_resend_delay_ms() -> u64 {
    DEFAULT_RESEND_DELAY_MS
}

fn default_splash_min_display_ms() -> u64 {
    DEFAULT_SPLASH_MIN_DISPLAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            web_app_url: default_web_app_url(),
            api_base_url: default_api_base_url(),
            readiness_poll_interval_ms: DEFAULT_READINESS_POLL_INTERVAL_MS,
            readiness_max_attempts: DEFAULT_READINESS_MAX_ATTEMPTS,
            resend_delay_ms: DEFAULT_RESEND_DELAY_MS,
            splash_min_display_ms: DEFAULT_SPLASH_MIN_DISPLAY_MS,
            delivery_mode: DeliveryMode::Dual,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> CoreResult<Self> {
        let mut config = Self::default();
        config.load_from_env()?;
        Ok(config)
    }

    /// Load configuration from `config.json` under the base directory,
    /// falling back to defaults, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) -> CoreResult<()> {
        if let Some(log_level) = env_value("GO2GO_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(url) = env_value("GO2GO_WEB_APP_URL") {
            self.web_app_url = url;
        }
        if let Some(url) = env_value("GO2GO_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(mode) = env_value("GO2GO_DELIVERY_MODE") {
            self.delivery_mode = mode.parse()?;
        }
        Ok(())
    }

    /// Reject values the handoff cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        self.web_app_url()?;
        self.api_base_url()?;
        if self.readiness_poll_interval_ms == 0 {
            return Err(CoreError::Config(
                "readiness_poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.readiness_max_attempts == 0 {
            return Err(CoreError::Config(
                "readiness_max_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The web application URL, parsed.
    pub fn web_app_url(&self) -> CoreResult<Url> {
        Url::parse(&self.web_app_url).map_err(CoreError::from)
    }

    /// The auth backend base URL, parsed.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_base_url).map_err(CoreError::from)
    }

    pub fn readiness_poll_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_interval_ms)
    }

    /// Total time the readiness probe keeps polling. Saturates instead of
    /// overflowing.
    pub fn readiness_ceiling(&self) -> Duration {
        self.readiness_poll_interval()
            .checked_mul(self.readiness_max_attempts)
            .unwrap_or(Duration::MAX)
    }

    pub fn resend_delay(&self) -> Duration {
        Duration::from_millis(self.resend_delay_ms)
    }

    pub fn splash_min_display(&self) -> Duration {
        Duration::from_millis(self.splash_min_display_ms)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
