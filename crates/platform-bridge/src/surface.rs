//! Platform surface trait.

use crate::BridgeResult;
use serde::{Deserialize, Serialize};

/// A running live activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveActivity {
    pub name: String,
    /// Dynamic content shown by the activity.
    #[serde(default)]
    pub emoji: String,
}

impl LiveActivity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: String::new(),
        }
    }
}

impl Default for LiveActivity {
    fn default() -> Self {
        Self::new("go2go")
    }
}

/// Native surfaces outside the WebView.
pub trait PlatformSurface: Send + Sync {
    fn start_live_activity(&self, activity: &LiveActivity) -> BridgeResult<()>;

    /// End every running live activity.
    fn end_live_activity(&self) -> BridgeResult<()>;

    /// Replace the widget's items, keeping their order.
    fn push_widget_items(&self, items: &[String]) -> BridgeResult<()>;
}

/// Surface that only logs. Used where no native surface exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSurface;

impl PlatformSurface for LoggingSurface {
    fn start_live_activity(&self, activity: &LiveActivity) -> BridgeResult<()> {
        tracing::info!(name = %activity.name, "Live activity start requested");
        Ok(())
    }

    fn end_live_activity(&self) -> BridgeResult<()> {
        tracing::info!("Live activity end requested");
        Ok(())
    }

    fn push_widget_items(&self, items: &[String]) -> BridgeResult<()> {
        tracing::info!(count = items.len(), "Widget items pushed");
        Ok(())
    }
}
