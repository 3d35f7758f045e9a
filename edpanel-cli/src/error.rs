//! CLI error type.

use std::fmt;
use std::io;

use edpanel::config::ConfigError;
use edpanel::service::ServiceError;

/// Everything a command can fail with.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, written or validated.
    Config(ConfigError),
    /// Logging could not be initialised.
    Logging(io::Error),
    /// The async runtime could not be created.
    Runtime(io::Error),
    /// The panel service failed.
    Service(ServiceError),
    /// A journal could not be read.
    Journal(String),
    /// The Ctrl+C handler could not be installed.
    Signal(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Logging(e) => write!(f, "Failed to initialise logging: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to create async runtime: {}", e),
            CliError::Service(e) => write!(f, "Service error: {}", e),
            CliError::Journal(msg) => write!(f, "Journal error: {}", msg),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Logging(e) | CliError::Runtime(e) => Some(e),
            CliError::Service(e) => Some(e),
            CliError::Journal(_) | CliError::Signal(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}
