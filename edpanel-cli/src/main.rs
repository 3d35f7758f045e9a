//! EdPanel CLI - command-line interface
//!
//! Runs the panel service against the Elite Dangerous journal folder and
//! prints every changed page set to the console. Also replays a single
//! journal offline and manages the configuration file.

mod commands;
mod display;
mod error;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::replay::ReplayArgs;
use commands::run::RunArgs;

#[derive(Debug, Parser)]
#[command(name = "edpanel", version, about = "Live Elite Dangerous status pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Watch the journal folder and show pages as they change (default)
    Run(RunArgs),

    /// Fold one journal file into a fresh session and print the result
    Replay(ReplayArgs),

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    {
        Commands::Run(args) => commands::run::run(args),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
