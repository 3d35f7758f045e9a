//! INI configuration file.
//!
//! The file lives at `<config dir>/edpanel/config.ini` and is created with
//! defaults on first run:
//!
//! ```ini
//! [journal]
//! folder = ~/Saved Games/Frontier Developments/Elite Dangerous
//!
//! [pages]
//! destination = true
//! location = true
//! cargo = true
//! min_body_value = 0
//!
//! [edsm]
//! base_url = https://www.edsm.net
//! timeout = 10
//!
//! [logging]
//! level = info
//! directory =
//!
//! [watch]
//! poll_interval_ms = 500
//!
//! [names]
//! directory =
//! ```
//!
//! Paths accept `~`, `%VAR%` and `$VAR`/`${VAR}` expansion. Backslashes are
//! taken literally so Windows paths need no escaping.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use ini::{EscapePolicy, Ini};
use regex::{Captures, Regex};
use thiserror::Error;

use crate::edsm::DEFAULT_BASE_URL;
use crate::pages::PageKind;
use crate::service::ServiceConfig;

/// Name of the application folder under the platform config directory.
pub const APP_DIR: &str = "edpanel";

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.ini";

/// Journal folder below the user's home directory.
const DEFAULT_JOURNAL_SUBDIR: &str = "Saved Games/Frontier Developments/Elite Dangerous";

/// Errors loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: ini::Error },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for [{section}] {key}: {reason}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("no pages enabled; enable at least one of destination, location, cargo")]
    NoPagesEnabled,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub journal_folder: PathBuf,
    pub destination_page: bool,
    pub location_page: bool,
    pub cargo_page: bool,
    pub min_body_value: i64,
    pub edsm_base_url: String,
    pub edsm_timeout_secs: u64,
    pub log_level: String,
    pub log_directory: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub names_directory: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            journal_folder: default_journal_folder(),
            destination_page: true,
            location_page: true,
            cargo_page: true,
            min_body_value: 0,
            edsm_base_url: DEFAULT_BASE_URL.to_string(),
            edsm_timeout_secs: 10,
            log_level: "info".to_string(),
            log_directory: None,
            poll_interval_ms: 500,
            names_directory: None,
        }
    }
}

/// `<home>/Saved Games/Frontier Developments/Elite Dangerous`.
pub fn default_journal_folder() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_JOURNAL_SUBDIR)
}

/// `<config dir>/edpanel`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoConfigDir)
}

/// `<config dir>/edpanel/config.ini`.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)%|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("environment variable pattern is valid")
    })
}

/// Expand `~` and environment variables in a configured path.
///
/// Unknown variables are left as written.
pub fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    let expanded = env_var_pattern().replace_all(raw, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });

    let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if expanded == "~" {
        return home();
    }
    if let Some(rest) = expanded
        .strip_prefix("~/")
        .or_else(|| expanded.strip_prefix("~\\"))
    {
        return home().join(rest);
    }
    PathBuf::from(expanded.into_owned())
}

fn parse_bool(section: &'static str, key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::Invalid {
            section,
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(
    section: &'static str,
    key: &'static str,
    value: &str,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        section,
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.trim().is_empty() {
        None
    } else {
        Some(expand_path(value))
    }
}

impl ConfigFile {
    /// Load from the default location, writing a default file if none
    /// exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load from `path`. Missing keys keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file_noescape(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Parse already-loaded INI content.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |section: &str, key: &str| ini.section(Some(section)).and_then(|s| s.get(key));

        if let Some(v) = get("journal", "folder") {
            if !v.trim().is_empty() {
                config.journal_folder = expand_path(v);
            }
        }

        if let Some(v) = get("pages", "destination") {
            config.destination_page = parse_bool("pages", "destination", v)?;
        }
        if let Some(v) = get("pages", "location") {
            config.location_page = parse_bool("pages", "location", v)?;
        }
        if let Some(v) = get("pages", "cargo") {
            config.cargo_page = parse_bool("pages", "cargo", v)?;
        }
        if let Some(v) = get("pages", "min_body_value") {
            config.min_body_value = parse_number("pages", "min_body_value", v)?;
        }

        if let Some(v) = get("edsm", "base_url") {
            if !v.trim().is_empty() {
                config.edsm_base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Some(v) = get("edsm", "timeout") {
            config.edsm_timeout_secs = parse_number("edsm", "timeout", v)?;
        }

        if let Some(v) = get("logging", "level") {
            if !v.trim().is_empty() {
                config.log_level = v.trim().to_string();
            }
        }
        if let Some(v) = get("logging", "directory") {
            config.log_directory = optional_path(v);
        }

        if let Some(v) = get("watch", "poll_interval_ms") {
            let ms: u64 = parse_number("watch", "poll_interval_ms", v)?;
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    section: "watch",
                    key: "poll_interval_ms",
                    value: v.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.poll_interval_ms = ms;
        }

        if let Some(v) = get("names", "directory") {
            config.names_directory = optional_path(v);
        }

        Ok(config)
    }

    /// Render as INI.
    pub fn to_ini(&self) -> Ini {
        let path_str = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let mut ini = Ini::new();
        ini.with_section(Some("journal"))
            .set("folder", self.journal_folder.to_string_lossy());
        ini.with_section(Some("pages"))
            .set("destination", self.destination_page.to_string())
            .set("location", self.location_page.to_string())
            .set("cargo", self.cargo_page.to_string())
            .set("min_body_value", self.min_body_value.to_string());
        ini.with_section(Some("edsm"))
            .set("base_url", self.edsm_base_url.as_str())
            .set("timeout", self.edsm_timeout_secs.to_string());
        ini.with_section(Some("logging"))
            .set("level", self.log_level.as_str())
            .set("directory", path_str(&self.log_directory));
        ini.with_section(Some("watch"))
            .set("poll_interval_ms", self.poll_interval_ms.to_string());
        ini.with_section(Some("names"))
            .set("directory", path_str(&self.names_directory));
        ini
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini()
            .write_to_file_policy(path, EscapePolicy::Nothing)
            .map_err(write_err)
    }

    /// Enabled pages in display order.
    pub fn enabled_pages(&self) -> Vec<PageKind> {
        PageKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                PageKind::Destination => self.destination_page,
                PageKind::Location => self.location_page,
                PageKind::Cargo => self.cargo_page,
            })
            .collect()
    }

    /// Log directory, defaulting to `<config dir>/edpanel/logs`.
    pub fn log_directory(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("logs")),
        }
    }

    /// Names directory, defaulting to `<config dir>/edpanel/names`.
    pub fn names_directory(&self) -> Result<PathBuf, ConfigError> {
        match &self.names_directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("names")),
        }
    }

    /// Build the service configuration. At least one page must be enabled.
    pub fn to_service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let pages = self.enabled_pages();
        if pages.is_empty() {
            return Err(ConfigError::NoPagesEnabled);
        }
        let mut config = ServiceConfig::new(self.journal_folder.clone())
            .with_pages(pages)
            .with_edsm_base_url(self.edsm_base_url.clone())
            .with_edsm_timeout(Duration::from_secs(self.edsm_timeout_secs))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_min_body_value(self.min_body_value);
        if let Ok(dir) = self.names_directory() {
            config = config.with_names_dir(dir);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_enables_all_pages() {
        let config = ConfigFile::default();
        assert_eq!(config.enabled_pages(), PageKind::ALL.to_vec());
        assert_eq!(config.edsm_timeout_secs, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE);

        let config = ConfigFile {
            journal_folder: temp.path().join("journal"),
            location_page: false,
            min_body_value: 250_000,
            log_directory: Some(temp.path().join("logs")),
            poll_interval_ms: 250,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.enabled_pages(),
            vec![PageKind::Destination, PageKind::Cargo]
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let ini = Ini::load_from_str("[pages]\ncargo = no\n").unwrap();
        let config = ConfigFile::from_ini(&ini).unwrap();
        assert!(!config.cargo_page);
        assert!(config.destination_page);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.edsm_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let ini = Ini::load_from_str("[pages]\ncargo = maybe\n").unwrap();
        assert!(matches!(
            ConfigFile::from_ini(&ini),
            Err(ConfigError::Invalid { key: "cargo", .. })
        ));

        let ini = Ini::load_from_str("[watch]\npoll_interval_ms = 0\n").unwrap();
        assert!(ConfigFile::from_ini(&ini).is_err());

        let ini = Ini::load_from_str("[edsm]\ntimeout = soon\n").unwrap();
        assert!(ConfigFile::from_ini(&ini).is_err());
    }

    #[test]
    fn test_no_pages_enabled() {
        let config = ConfigFile {
            destination_page: false,
            location_page: false,
            cargo_page: false,
            ..Default::default()
        };
        assert!(matches!(
            config.to_service_config(),
            Err(ConfigError::NoPagesEnabled)
        ));
    }

    #[test]
    fn test_service_config_from_file() {
        let config = ConfigFile {
            journal_folder: PathBuf::from("/journal"),
            destination_page: false,
            edsm_timeout_secs: 3,
            ..Default::default()
        };
        let service = config.to_service_config().unwrap();
        assert_eq!(service.journal_folder, PathBuf::from("/journal"));
        assert_eq!(service.pages, vec![PageKind::Location, PageKind::Cargo]);
        assert_eq!(service.edsm_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_expand_path() {
        std::env::set_var("EDPANEL_TEST_DIR", "/data/elite");
        assert_eq!(
            expand_path("%EDPANEL_TEST_DIR%/journal"),
            PathBuf::from("/data/elite/journal")
        );
        assert_eq!(
            expand_path("$EDPANEL_TEST_DIR/journal"),
            PathBuf::from("/data/elite/journal")
        );
        assert_eq!(
            expand_path("${EDPANEL_TEST_DIR}/journal"),
            PathBuf::from("/data/elite/journal")
        );
        assert_eq!(
            expand_path("%EDPANEL_SURELY_UNSET%/x"),
            PathBuf::from("%EDPANEL_SURELY_UNSET%/x")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/journal"), home.join("journal"));
        }
    }
}
