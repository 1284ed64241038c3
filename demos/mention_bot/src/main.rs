//! Mention Bot
//!
//! Connects to Discord and relays every message that mentions the bot back
//! to the same channel, with the mentions stripped, while showing itself as
//! "Playing with <author>".
//!
//! # Usage
//!
//! ```bash
//! echo "$DISCORD_TOKEN" > token.dat
//! cargo run --package mention-bot
//! ```
//!
//! Settings come from `ferrite.toml` and `FERRITE_*` variables; see
//! `ferrite_runtime::config`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ferrite::prelude::*;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (default: search for ferrite.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File holding the bot token on its first line
    #[arg(short, long)]
    token_file: Option<PathBuf>,

    /// Configuration profile, e.g. "production"
    #[arg(short, long)]
    profile: Option<String>,
}

fn build_runtime(args: Args) -> Result<FerriteRuntime, RuntimeError> {
    let mut builder = FerriteRuntime::builder();
    if let Some(path) = args.config {
        builder = builder.config_file(path);
    }
    if let Some(path) = args.token_file {
        builder = builder.token_file(path);
    }
    if let Some(profile) = args.profile {
        builder = builder.profile(profile);
    }
    builder.build()
}

async fn run(runtime: FerriteRuntime) -> Result<()> {
    runtime.register(
        EventKind::MessageDelete,
        handler_fn(|event: InboundEvent| async move {
            let id = event.data.get("id").and_then(Value::as_str).unwrap_or("?");
            info!(message_id = %id, "Message deleted");
            Ok(())
        }),
    );

    let connector = DiscordConnector::new(runtime.gateway_config(), runtime.rest_config());
    runtime.run_with(&connector).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let runtime = match build_runtime(args) {
        Ok(runtime) => runtime,
        Err(RuntimeError::Token(e)) => {
            eprintln!("CRITICAL: {e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(runtime).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
