//! Widget and live activity commands.

use super::Context;
use crate::output;
use anyhow::Result;
use platform_bridge::LiveActivity;

pub fn widget_push(ctx: &Context, items: &[String]) -> Result<()> {
    ctx.side_channel().update_widget(items);
    output::print_success(&format!("Widget updated ({} items)", items.len()), &ctx.format);
    Ok(())
}

pub fn live_activity_start(ctx: &Context, name: String, emoji: String) -> Result<()> {
    ctx.side_channel()
        .start_live_activity(&LiveActivity { name, emoji });
    output::print_success("Live activity started", &ctx.format);
    Ok(())
}

pub fn live_activity_end(ctx: &Context) -> Result<()> {
    ctx.side_channel().end_live_activity();
    output::print_success("Live activity ended", &ctx.format);
    Ok(())
}
