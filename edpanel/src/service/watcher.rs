//! Polling folder watcher.
//!
//! Scans the journal folder on a fixed interval and reports which files
//! appeared, changed or vanished since the previous scan. Changes are
//! detected by length and modification time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::logging::clean_path;
use crate::snapshot::FileFingerprint;

/// Messages consumed by the service's update task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Files in the journal folder changed.
    FilesChanged(Vec<PathBuf>),
    /// Run an update pass regardless of file changes.
    Refresh,
    /// The display was re-initialised and needs every page again.
    Reinitialize,
}

/// Tracks file fingerprints across scans of one folder.
#[derive(Debug)]
pub struct FolderWatcher {
    folder: PathBuf,
    interval: Duration,
    known: HashMap<PathBuf, FileFingerprint>,
}

impl FolderWatcher {
    pub fn new(folder: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            folder: folder.into(),
            interval,
            known: HashMap::new(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Scan the folder and return the paths that differ from the last scan,
    /// sorted.
    ///
    /// A folder that cannot be listed looks empty, so every known file is
    /// reported once as removed.
    pub fn scan(&mut self) -> Vec<PathBuf> {
        let mut current = HashMap::new();
        match fs::read_dir(&self.folder) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_file() {
                        let fingerprint = FileFingerprint::of(&path);
                        current.insert(path, fingerprint);
                    }
                }
            }
            Err(e) => {
                trace!(folder = %clean_path(&self.folder), error = %e, "Folder not readable");
            }
        }

        let mut changed: Vec<PathBuf> = current
            .iter()
            .filter(|(path, fingerprint)| self.known.get(*path) != Some(*fingerprint))
            .map(|(path, _)| path.clone())
            .collect();
        changed.extend(
            self.known
                .keys()
                .filter(|path| !current.contains_key(*path))
                .cloned(),
        );
        changed.sort();

        self.known = current;
        changed
    }

    /// Scan until `shutdown` fires, sending a notification for each scan
    /// that found changes.
    ///
    /// The first scan always reports the files already present.
    pub async fn run(mut self, tx: mpsc::Sender<Notification>, shutdown: CancellationToken) {
        debug!(
            folder = %clean_path(&self.folder),
            interval_ms = self.interval.as_millis() as u64,
            "Folder watcher starting"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                _ = ticker.tick() => {
                    let changed = self.scan();
                    if changed.is_empty() {
                        continue;
                    }
                    trace!(count = changed.len(), "Folder changed");
                    if tx.send(Notification::FilesChanged(changed)).await.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("Folder watcher stopped");
    }
}
