//! JSON-line bridge between the WebView host and the session runtime.
//!
//! Each stdin line is one host event, tagged by `event`:
//!
//! ```text
//! {"event":"load_started"}
//! {"event":"load_finished"}
//! {"event":"message","data":"WEBVIEW_READY"}
//! {"event":"login_temp","nickname":"mochi"}
//! {"event":"login_apple","credential":{"authorization_code":"..."}}
//! {"event":"resend"} | {"event":"logout"} | {"event":"status"}
//! {"event":"widget","items":["a","b"]}
//! {"event":"live_activity_start","name":"timer"} | {"event":"live_activity_end"}
//! ```
//!
//! Stdout carries page commands, notices and status lines, tagged by `type`.

use super::Context;
use crate::page::{BridgeLine, LinePage, LineSink};
use anyhow::Result;
use login_adapters::{
    AppleCredential, AppleLoginAdapter, AuthApiClient, LoginAdapter, TempLoginAdapter,
};
use platform_bridge::{LiveActivity, SideChannel};
use serde::Deserialize;
use session_handoff::ShellRuntime;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum HostEvent {
    LoadStarted,
    LoadFinished,
    /// Raw page message. Objects are passed on as their JSON text.
    Message {
        data: serde_json::Value,
    },
    Resend,
    Logout,
    Status,
    LoginTemp {
        nickname: String,
    },
    LoginApple {
        #[serde(default)]
        credential: AppleCredential,
    },
    Widget {
        #[serde(default)]
        items: Vec<String>,
    },
    LiveActivityStart {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        emoji: String,
    },
    LiveActivityEnd,
}

impl HostEvent {
    fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

fn message_text(data: serde_json::Value) -> String {
    match data {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

struct Bridge {
    runtime: ShellRuntime,
    sink: LineSink,
    side_channel: SideChannel,
    temp: TempLoginAdapter,
    apple: AppleLoginAdapter,
}

impl Bridge {
    fn new(
        runtime: ShellRuntime,
        sink: LineSink,
        side_channel: SideChannel,
        client: AuthApiClient,
    ) -> Self {
        Self {
            runtime,
            sink,
            side_channel,
            temp: TempLoginAdapter::new(client.clone()),
            apple: AppleLoginAdapter::new(client),
        }
    }

    fn emit(&self, line: &BridgeLine<'_>) {
        if let Err(e) = self.sink.emit(line) {
            warn!(error = %e, "Failed to write bridge line");
        }
    }

    fn emit_status(&self) {
        let snapshot = self.runtime.snapshot();
        self.emit(&BridgeLine::Status(&snapshot));
    }

    /// Forward runtime notices to the host until the runtime goes away.
    fn forward_notices(&self) -> JoinHandle<()> {
        let mut notices = self.runtime.subscribe();
        let sink = self.sink.clone();
        tokio::spawn(async move {
            loop {
                match notices.recv().await {
                    Ok(notice) => {
                        if let Err(e) = sink.emit(&BridgeLine::Notice(&notice)) {
                            warn!(error = %e, "Failed to write notice");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Notice forwarder lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn handle_line(&self, line: &str, logins: &mut JoinSet<()>) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match HostEvent::parse(line) {
            Ok(event) => self.handle(event, logins),
            Err(e) => {
                debug!(error = %e, "Unparseable host event");
                self.emit(&BridgeLine::Error {
                    message: format!("invalid event: {}", e),
                });
            }
        }
    }

    fn handle(&self, event: HostEvent, logins: &mut JoinSet<()>) {
        match event {
            HostEvent::LoadStarted => self.runtime.page_load_started(),
            HostEvent::LoadFinished => self.runtime.page_load_finished(),
            HostEvent::Message { data } => self.runtime.page_message(&message_text(data)),
            HostEvent::Resend => self.runtime.request_resend(),
            HostEvent::Logout => {
                self.runtime.logout();
            }
            HostEvent::Status => self.emit_status(),
            HostEvent::LoginTemp { nickname } => {
                self.spawn_login(logins, self.temp.clone(), nickname);
            }
            HostEvent::LoginApple { credential } => {
                self.spawn_login(logins, self.apple.clone(), credential);
            }
            HostEvent::Widget { items } => self.side_channel.update_widget(&items),
            HostEvent::LiveActivityStart { name, emoji } => {
                let mut activity = name.map(LiveActivity::new).unwrap_or_default();
                activity.emoji = emoji;
                self.side_channel.start_live_activity(&activity);
            }
            HostEvent::LiveActivityEnd => self.side_channel.end_live_activity(),
        }
    }

    /// Logins run in the background so page events keep flowing meanwhile.
    fn spawn_login<A>(&self, logins: &mut JoinSet<()>, adapter: A, payload: A::Payload)
    where
        A: LoginAdapter + 'static,
    {
        let runtime = self.runtime.clone();
        let sink = self.sink.clone();
        logins.spawn(async move {
            let method = adapter.method();
            match runtime.login(&adapter, payload).await {
                Ok(snapshot) => {
                    info!(method = %method, "Bridge login complete");
                    if let Err(e) = sink.emit(&BridgeLine::Status(&snapshot)) {
                        warn!(error = %e, "Failed to write bridge line");
                    }
                }
                Err(e) => {
                    let line = BridgeLine::Error {
                        message: e.user_message(),
                    };
                    if let Err(e) = sink.emit(&line) {
                        warn!(error = %e, "Failed to write bridge line");
                    }
                }
            }
        });
    }
}

/// Run the bridge until stdin closes.
pub async fn bridge(ctx: &Context) -> Result<()> {
    let sink = LineSink::stdout();
    let runtime = ctx.runtime(Arc::new(LinePage::new(sink.clone())))?;
    let bridge = Bridge::new(runtime, sink, ctx.side_channel(), ctx.auth_client()?);

    let notices = bridge.forward_notices();
    let snapshot = bridge.runtime.start();
    bridge.emit(&BridgeLine::Status(&snapshot));
    info!(logged_in = snapshot.logged_in, "Bridge started");

    let splash = {
        let runtime = bridge.runtime.clone();
        let sink = bridge.sink.clone();
        tokio::spawn(async move {
            runtime.wait_for_splash().await;
            if let Err(e) = sink.emit(&BridgeLine::SplashReady) {
                warn!(error = %e, "Failed to write bridge line");
            }
        })
    };

    let mut logins = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        bridge.handle_line(&line, &mut logins);
    }

    info!("Host closed the bridge");
    while logins.join_next().await.is_some() {}
    splash.abort();
    notices.abort();
    Ok(())
}
