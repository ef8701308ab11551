//! Session commands.

use super::Context;
use crate::output::{self, OutputFormat};
use crate::page::DetachedPage;
use anyhow::Result;
use login_adapters::{AppleCredential, AppleLoginAdapter, LoginAdapter, TempLoginAdapter};
use session_handoff::{scripts, SessionSnapshot};
use std::sync::Arc;

/// Show the persisted session and configuration.
pub fn status(ctx: &Context) -> Result<()> {
    let runtime = ctx.runtime(Arc::new(DetachedPage))?;
    let snapshot = runtime.start();

    match ctx.format {
        OutputFormat::Text => {
            output::print_row("Logged in", output::yes_no(snapshot.logged_in));
            output::print_row("Session file", &ctx.paths.session_file().to_string_lossy());
            output::print_row("Web app", &ctx.config.web_app_url);
            output::print_row("API", &ctx.config.api_base_url);
            output::print_row("Delivery", &format!("{:?}", ctx.config.delivery_mode));
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "session": snapshot,
            "session_file": ctx.paths.session_file(),
            "web_app_url": ctx.config.web_app_url,
            "api_base_url": ctx.config.api_base_url,
            "delivery_mode": ctx.config.delivery_mode,
        })),
    }
    Ok(())
}

/// Log in with a temporary nickname.
pub async fn login_temp(ctx: &Context, nickname: String) -> Result<()> {
    let adapter = TempLoginAdapter::new(ctx.auth_client()?);
    login_with(ctx, &adapter, nickname).await
}

/// Log in with an Apple credential.
pub async fn login_apple(ctx: &Context, credential: AppleCredential) -> Result<()> {
    let adapter = AppleLoginAdapter::new(ctx.auth_client()?);
    login_with(ctx, &adapter, credential).await
}

async fn login_with<A: LoginAdapter>(ctx: &Context, adapter: &A, payload: A::Payload) -> Result<()> {
    let runtime = ctx.runtime(Arc::new(DetachedPage))?;
    runtime.start();

    match runtime.login(adapter, payload).await {
        Ok(snapshot) => {
            print_snapshot("Logged in", &snapshot, &ctx.format);
            Ok(())
        }
        Err(e) => anyhow::bail!(e.user_message()),
    }
}

/// Clear the persisted session.
pub fn logout(ctx: &Context) -> Result<()> {
    let runtime = ctx.runtime(Arc::new(DetachedPage))?;
    runtime.start();
    let snapshot = runtime.logout();
    print_snapshot("Logged out", &snapshot, &ctx.format);
    Ok(())
}

/// Print the readiness probe script.
pub fn probe_script(ctx: &Context) -> Result<()> {
    let script = scripts::readiness_probe_script(
        ctx.config.readiness_poll_interval(),
        ctx.config.readiness_max_attempts,
    );
    match ctx.format {
        OutputFormat::Text => println!("{}", script),
        OutputFormat::Json => output::print_json(&serde_json::json!({ "script": script })),
    }
    Ok(())
}

fn print_snapshot(message: &str, snapshot: &SessionSnapshot, format: &OutputFormat) {
    match format {
        OutputFormat::Text => output::print_success(message, format),
        OutputFormat::Json => output::print_json(snapshot),
    }
}
