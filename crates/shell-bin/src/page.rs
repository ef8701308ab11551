//! Page channels for the host bridge.

use parking_lot::Mutex;
use serde::Serialize;
use session_handoff::{
    HandoffError, HandoffResult, PageChannel, PageCommand, SessionNotice, SessionSnapshot,
};
use std::io::Write;
use std::sync::Arc;

/// One line written to the host.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeLine<'a> {
    Command(&'a PageCommand),
    Notice(&'a SessionNotice),
    Status(&'a SessionSnapshot),
    Error { message: String },
    /// Minimum splash time is over and startup has finished.
    SplashReady,
}

/// Newline-delimited JSON writer shared by every producer.
#[derive(Clone)]
pub struct LineSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl LineSink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn emit(&self, line: &BridgeLine<'_>) -> std::io::Result<()> {
        let json = serde_json::to_string(line)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        writer.flush()
    }
}

/// Forwards page commands to the host as JSON lines.
pub struct LinePage {
    sink: LineSink,
}

impl LinePage {
    pub fn new(sink: LineSink) -> Self {
        Self { sink }
    }

    fn forward(&self, command: PageCommand) -> HandoffResult<()> {
        self.sink
            .emit(&BridgeLine::Command(&command))
            .map_err(|e| HandoffError::Page(e.to_string()))
    }
}

impl PageChannel for LinePage {
    fn post_message(&self, message: &str) -> HandoffResult<()> {
        self.forward(PageCommand::PostMessage(message.to_string()))
    }

    fn inject_script(&self, script: &str) -> HandoffResult<()> {
        self.forward(PageCommand::InjectScript(script.to_string()))
    }

    fn reload(&self) -> HandoffResult<()> {
        self.forward(PageCommand::Reload)
    }
}

/// Used by one-shot commands: there is no page to talk to.
pub struct DetachedPage;

impl PageChannel for DetachedPage {
    fn post_message(&self, _message: &str) -> HandoffResult<()> {
        tracing::debug!("No page attached, message dropped");
        Ok(())
    }

    fn inject_script(&self, _script: &str) -> HandoffResult<()> {
        tracing::debug!("No page attached, script dropped");
        Ok(())
    }

    fn reload(&self) -> HandoffResult<()> {
        Ok(())
    }
}
