//! CLI command implementations.

mod bridge;
mod platform;
mod session;

pub use bridge::bridge;
pub use platform::{live_activity_end, live_activity_start, widget_push};
pub use session::{login_apple, login_temp, logout, probe_script, status};

use crate::output::OutputFormat;
use anyhow::Result;
use login_adapters::AuthApiClient;
use platform_bridge::{HostPlatform, SharedWidgetSurface, SideChannel};
use session_handoff::{PageChannel, ShellRuntime};
use shell_config_and_utils::{Config, Paths};
use std::sync::Arc;

/// Everything a command needs from the process environment.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    /// Runtime over the persisted session file.
    pub fn runtime(&self, page: Arc<dyn PageChannel>) -> Result<ShellRuntime> {
        let store = shell_storage::create_file_token_store(&self.paths.session_file())?;
        Ok(ShellRuntime::from_config(&self.config, store, page))
    }

    pub fn auth_client(&self) -> Result<AuthApiClient> {
        Ok(AuthApiClient::new(self.config.api_base_url()?))
    }

    pub fn side_channel(&self) -> SideChannel {
        let surface = SharedWidgetSurface::new(&self.paths.widget_file());
        SideChannel::new(Arc::new(surface), HostPlatform::current())
    }
}
