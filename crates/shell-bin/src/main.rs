//! go2go shell host bridge.
//!
//! Drives the session runtime from a host process: one-shot commands for
//! login, logout and status, and a `bridge` mode that exchanges JSON lines
//! with the WebView host.

mod commands;
mod output;
mod page;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shell_config_and_utils::{init_logging, Config, Paths};

/// go2go shell command-line interface.
#[derive(Parser)]
#[command(name = "go2go-shell")]
#[command(about = "Session and token handoff for the go2go WebView shell")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for shell state (config, session, logs). Defaults to ~/.go2go
    #[arg(long, global = true, env = "GO2GO_HOME")]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the persisted session and configuration
    Status,

    /// Log in and persist the session
    Login {
        #[command(subcommand)]
        method: LoginCommands,
    },

    /// Clear the persisted session
    Logout,

    /// Print the readiness probe script for the configured timings
    ProbeScript,

    /// Update the home-screen widget
    Widget {
        #[command(subcommand)]
        command: WidgetCommands,
    },

    /// Start or end the live activity
    LiveActivity {
        #[command(subcommand)]
        command: LiveActivityCommands,
    },

    /// Exchange JSON lines with the WebView host over stdin/stdout
    Bridge,
}

#[derive(Subcommand)]
enum LoginCommands {
    /// Log in with a temporary nickname
    Temp {
        /// Nickname (2 to 10 characters)
        nickname: String,
    },
    /// Log in with an Apple identity credential
    Apple {
        /// Authorization code
        #[arg(long)]
        code: Option<String>,
        /// Identity token
        #[arg(long)]
        id_token: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Request state; generated when omitted
        #[arg(long)]
        state: Option<String>,
    },
}

#[derive(Subcommand)]
enum WidgetCommands {
    /// Replace the widget items, in order
    Push {
        /// Items to show
        items: Vec<String>,
    },
    /// Remove all widget items
    Clear,
}

#[derive(Subcommand)]
enum LiveActivityCommands {
    /// Start a live activity
    Start {
        /// Activity name
        #[arg(long, default_value = "go2go")]
        name: String,
        /// Content shown by the activity
        #[arg(long, default_value = "")]
        emoji: String,
    },
    /// End every running live activity
    End,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;

    let level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, &paths);

    let ctx = commands::Context {
        paths,
        config,
        format: cli.format,
    };

    match cli.command {
        Commands::Status => commands::status(&ctx),
        Commands::Login { method } => match method {
            LoginCommands::Temp { nickname } => commands::login_temp(&ctx, nickname).await,
            LoginCommands::Apple {
                code,
                id_token,
                email,
                first_name,
                last_name,
                state,
            } => {
                let credential = login_adapters::AppleCredential {
                    authorization_code: code,
                    identity_token: id_token,
                    email,
                    given_name: first_name,
                    family_name: last_name,
                    state,
                };
                commands::login_apple(&ctx, credential).await
            }
        },
        Commands::Logout => commands::logout(&ctx),
        Commands::ProbeScript => commands::probe_script(&ctx),
        Commands::Widget { command } => match command {
            WidgetCommands::Push { items } => commands::widget_push(&ctx, &items),
            WidgetCommands::Clear => commands::widget_push(&ctx, &[]),
        },
        Commands::LiveActivity { command } => match command {
            LiveActivityCommands::Start { name, emoji } => {
                commands::live_activity_start(&ctx, name, emoji)
            }
            LiveActivityCommands::End => commands::live_activity_end(&ctx),
        },
        Commands::Bridge => commands::bridge(&ctx).await,
    }
}
