//! Configuration for the panel service.

use std::path::PathBuf;
use std::time::Duration;

use crate::edsm::DEFAULT_BASE_URL;
use crate::pages::PageKind;

/// Default interval between folder scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default EDSM request timeout.
pub const DEFAULT_EDSM_TIMEOUT: Duration = Duration::from_secs(10);

/// The resolved configuration the service runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Folder containing the journal and snapshot files.
    pub journal_folder: PathBuf,

    /// Enabled pages. Rendered in display order regardless of the order
    /// given here.
    pub pages: Vec<PageKind>,

    /// EDSM base URL, without trailing slash.
    pub edsm_base_url: String,

    /// EDSM request timeout.
    pub edsm_timeout: Duration,

    /// Interval between folder scans.
    pub poll_interval: Duration,

    /// Folder holding `commodity.csv` and `rare_commodity.csv`.
    pub names_dir: Option<PathBuf>,

    /// Valuable bodies below this estimated value are not listed.
    pub min_body_value: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            journal_folder: PathBuf::from("."),
            pages: PageKind::ALL.to_vec(),
            edsm_base_url: DEFAULT_BASE_URL.to_string(),
            edsm_timeout: DEFAULT_EDSM_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            names_dir: None,
            min_body_value: 0,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration watching `journal_folder` with every page
    /// enabled.
    pub fn new(journal_folder: impl Into<PathBuf>) -> Self {
        Self {
            journal_folder: journal_folder.into(),
            ..Default::default()
        }
    }

    /// Set the enabled pages.
    pub fn with_pages(mut self, pages: impl IntoIterator<Item = PageKind>) -> Self {
        self.pages = pages.into_iter().collect();
        self
    }

    /// Set the EDSM base URL.
    pub fn with_edsm_base_url(mut self, url: impl Into<String>) -> Self {
        self.edsm_base_url = url.into();
        self
    }

    /// Set the EDSM request timeout.
    pub fn with_edsm_timeout(mut self, timeout: Duration) -> Self {
        self.edsm_timeout = timeout;
        self
    }

    /// Set the folder scan interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the commodity name table folder.
    pub fn with_names_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.names_dir = Some(dir.into());
        self
    }

    /// Set the valuable body threshold.
    pub fn with_min_body_value(mut self, value: i64) -> Self {
        self.min_body_value = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.pages, PageKind::ALL.to_vec());
        assert_eq!(config.edsm_base_url, "https://www.edsm.net");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(config.names_dir.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ServiceConfig::new("/journal")
            .with_pages([PageKind::Cargo])
            .with_edsm_base_url("http://localhost:8080")
            .with_edsm_timeout(Duration::from_secs(3))
            .with_poll_interval(Duration::from_millis(100))
            .with_names_dir("/names")
            .with_min_body_value(100_000);

        assert_eq!(config.journal_folder, PathBuf::from("/journal"));
        assert_eq!(config.pages, vec![PageKind::Cargo]);
        assert_eq!(config.edsm_timeout, Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.names_dir, Some(PathBuf::from("/names")));
        assert_eq!(config.min_body_value, 100_000);
    }
}
