//! File-backed shared snapshot read by the widget extension.

use crate::{BridgeResult, LiveActivity, PlatformSurface};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the widget extension reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSnapshot {
    /// Widget items, in display order.
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_activity: Option<LiveActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// [`PlatformSurface`] persisting to a JSON file shared with the widget.
pub struct SharedWidgetSurface {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    lock: Mutex<()>,
}

impl SharedWidgetSurface {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot; a missing file reads as empty.
    pub fn read(&self) -> BridgeResult<SharedSnapshot> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(SharedSnapshot::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SharedSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, change: impl FnOnce(&mut SharedSnapshot)) -> BridgeResult<()> {
        let _guard = self.lock.lock();
        let mut snapshot = self.read()?;
        change(&mut snapshot);
        snapshot.updated_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(&snapshot)?;
        shell_storage::atomic_write(&self.path, content.as_bytes())?;
        Ok(())
    }
}

impl PlatformSurface for SharedWidgetSurface {
    fn start_live_activity(&self, activity: &LiveActivity) -> BridgeResult<()> {
        self.update(|snapshot| snapshot.live_activity = Some(activity.clone()))
    }

    fn end_live_activity(&self) -> BridgeResult<()> {
        self.update(|snapshot| snapshot.live_activity = None)
    }

    fn push_widget_items(&self, items: &[String]) -> BridgeResult<()> {
        self.update(|snapshot| snapshot.items = items.to_vec())
    }
}
