//! Native side-channel for the go2go shell.
//!
//! Two fire-and-forget signals the web app can trigger: start/end a live
//! activity, and push an ordered list of short items to the home-screen
//! widget. Nothing in the session flow waits on them.

mod error;
mod side_channel;
mod surface;
mod widget;

pub use error::{BridgeError, BridgeResult};
pub use side_channel::{HostPlatform, SideChannel};
pub use surface::{LiveActivity, LoggingSurface, PlatformSurface};
pub use widget::{SharedSnapshot, SharedWidgetSurface};
