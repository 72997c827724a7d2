use std::path::PathBuf;

use anyhow::Result;
use avp_remote::app::{run, Invocation, RunOptions};
use avp_remote::domain::actions::ControlAction;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "avp-remote",
    version,
    about = "Terminal remote control for a networked media player"
)]
struct Cli {
    #[arg(long, help = "Enable verbose debug logs")]
    debug: bool,
    #[arg(long, value_name = "URL", help = "Player server base URL")]
    base_url: Option<String>,
    #[arg(long, value_name = "PATH", help = "Config file to read instead of the default")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the player's current status and exit
    Status,
    /// Send one control action (play, pause, next, prev, vol_up, vol_down, stop, mute)
    Send {
        #[arg(value_parser = parse_action)]
        action: ControlAction,
    },
    /// Play a catalog video by name
    Play { name: String },
}

fn parse_action(value: &str) -> Result<ControlAction, String> {
    ControlAction::parse(value).map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let invocation = match cli.command {
        None => Invocation::Tui,
        Some(Command::Status) => Invocation::Status,
        Some(Command::Send { action }) => Invocation::Send(action),
        Some(Command::Play { name }) => Invocation::Play(name),
    };

    run(RunOptions {
        debug: cli.debug,
        config_path: cli.config,
        base_url: cli.base_url,
        invocation,
    })
}
