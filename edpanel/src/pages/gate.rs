//! Display change gate.
//!
//! Compares each composed page set with the last one the display accepted
//! and forwards only real changes.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::page::PageSet;

/// Errors reported by a display collaborator.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The device is not connected or not initialised.
    #[error("display unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Receives complete page sets.
///
/// The display driver and any auxiliary notification target implement this.
pub trait DisplaySink: Send + Sync {
    /// Show `pages`, replacing whatever is displayed.
    fn show(&self, pages: &PageSet) -> Result<(), DisplayError>;
}

/// Forwards page sets to the display only when they differ from the last
/// committed set.
pub struct DisplayGate {
    display: Arc<dyn DisplaySink>,
    notifier: Option<Arc<dyn DisplaySink>>,
    committed: Option<PageSet>,
}

impl DisplayGate {
    pub fn new(display: Arc<dyn DisplaySink>) -> Self {
        Self {
            display,
            notifier: None,
            committed: None,
        }
    }

    /// Also send every committed set to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn DisplaySink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Offer a freshly composed set.
    ///
    /// Returns `Ok(true)` if it was sent. A set the display rejects is not
    /// committed, so the next offer retries it. Notifier failures are logged
    /// only.
    pub fn submit(&mut self, pages: PageSet) -> Result<bool, DisplayError> {
        if self.committed.as_ref() == Some(&pages) {
            return Ok(false);
        }

        self.display.show(&pages)?;
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.show(&pages) {
                warn!(error = %e, "Notification sink rejected page update");
            }
        }
        debug!(pages = pages.len(), "Display updated");
        self.committed = Some(pages);
        Ok(true)
    }

    /// Forget the committed set so the next offer is always sent.
    pub fn reset(&mut self) {
        self.committed = None;
    }

    /// The set last accepted by the display.
    pub fn committed(&self) -> Option<&PageSet> {
        self.committed.as_ref()
    }
}
