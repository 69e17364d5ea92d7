pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::sync::SyncArgs;

#[derive(Debug, Parser)]
#[command(
    name = "clientsync",
    about = "Customer directory to client-management sync",
    long_about = "Copy customer records from the source directory API into the destination client API in bounded batches, creating or updating each client by name.",
    after_help = "Examples:\n  clientsync sync --total 3 --batch-size 2 --offset 1\n  clientsync config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Synchronize a window of source customers into the destination")]
    Sync(SyncArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Sync(args) => commands::sync::run(cli.config, &args),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(cli.config) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
