//! Fire-and-forget front for a [`PlatformSurface`].

use crate::{BridgeError, LiveActivity, PlatformSurface};
use std::fmt;
use std::sync::Arc;

/// Platform the shell runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Ios,
    Android,
    Other,
}

impl HostPlatform {
    /// Platform of the current build.
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            HostPlatform::Ios
        } else if cfg!(target_os = "android") {
            HostPlatform::Android
        } else {
            HostPlatform::Other
        }
    }

    /// Live activities and the widget exist only on iOS. Desktop builds
    /// use a file-backed stand-in and count as supported.
    pub fn has_native_surfaces(&self) -> bool {
        !matches!(self, HostPlatform::Android)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPlatform::Ios => write!(f, "ios"),
            HostPlatform::Android => write!(f, "android"),
            HostPlatform::Other => write!(f, "other"),
        }
    }
}

/// Calls never fail from the caller's point of view; errors are logged.
#[derive(Clone)]
pub struct SideChannel {
    surface: Arc<dyn PlatformSurface>,
    platform: HostPlatform,
}

impl SideChannel {
    pub fn new(surface: Arc<dyn PlatformSurface>, platform: HostPlatform) -> Self {
        Self { surface, platform }
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    pub fn start_live_activity(&self, activity: &LiveActivity) {
        self.fire("start_live_activity", |surface| {
            surface.start_live_activity(activity)
        });
    }

    pub fn end_live_activity(&self) {
        self.fire("end_live_activity", |surface| surface.end_live_activity());
    }

    pub fn update_widget(&self, items: &[String]) {
        self.fire("push_widget_items", |surface| surface.push_widget_items(items));
    }

    fn fire<F>(&self, operation: &'static str, call: F)
    where
        F: FnOnce(&dyn PlatformSurface) -> Result<(), BridgeError>,
    {
        if !self.platform.has_native_surfaces() {
            tracing::debug!(operation, platform = %self.platform, "Side-channel call skipped");
            return;
        }
        match call(self.surface.as_ref()) {
            Ok(()) => tracing::debug!(operation, "Side-channel call done"),
            Err(e) => tracing::warn!(operation, error = %e, "Side-channel call failed"),
        }
    }
}
