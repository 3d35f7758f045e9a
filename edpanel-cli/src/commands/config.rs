//! Configuration file CLI commands.

use std::path::Path;

use clap::Subcommand;
use edpanel::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,

    /// Write a configuration file with default settings
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init { force } => run_init(&config_file_path()?, force),
    }
}

/// Render the settings as `[section]` blocks of `key = value` lines.
pub fn format_settings(config: &ConfigFile) -> String {
    let mut out = String::new();
    for (section, properties) in config.to_ini().iter() {
        let Some(section) = section else { continue };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", section));
        for (key, value) in properties.iter() {
            if value.is_empty() {
                out.push_str(&format!("  {} = (not set)\n", key));
            } else {
                out.push_str(&format!("  {} = {}\n", key, value));
            }
        }
    }
    out
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");
    println!();
    print!("{}", format_settings(&config));
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path()?.display());
    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        println!("Configuration already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }
    ConfigFile::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
