use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod notifier;
mod prefs_cmd;
mod queue;
mod reminders_cmd;
mod source;
mod state;

use prefs_cmd::PrefsCommand;
use reminders_cmd::RemindersCommand;

#[derive(Parser, Debug)]
#[command(
    name = "chorewheel",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CHOREWHEEL_GIT_DESCRIBE"), ")"),
    about = "Local chore reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Reminders(RemindersCommand),

    /// Device notification preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },

    /// Write ~/.chorewheel/config.toml with defaults
    InitConfig,

    /// Show effective config and what to set
    ConfigCheck,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CHOREWHEEL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Reminders(cmd) => reminders_cmd::run(cmd).await?,
        Command::Prefs { command } => prefs_cmd::run(command)?,
        Command::InitConfig => config::init_config()?,
        Command::ConfigCheck => config::config_check()?,
    }

    Ok(())
}
