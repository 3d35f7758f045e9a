//! Helpers shared across CLI commands.

use std::path::Path;

use edpanel::config::ConfigFile;

use crate::error::CliError;

/// Load the configuration from `path`, or from the default location
/// (creating it) when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
