//! Change detection for whole-file snapshots.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Observable identity of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFingerprint {
    /// The file does not exist (or cannot be inspected).
    Missing,
    /// The file exists with this size and modification time.
    Present { len: u64, modified: Option<SystemTime> },
}

impl FileFingerprint {
    /// Inspect `path`.
    pub fn of(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => FileFingerprint::Present {
                len: meta.len(),
                modified: meta.modified().ok(),
            },
            _ => FileFingerprint::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FileFingerprint::Missing)
    }
}

/// Remembers the fingerprint of the last successfully processed read.
///
/// A fingerprint is only committed after the file was parsed, so a file
/// caught mid-write is retried on the next notification.
#[derive(Debug, Default, Clone)]
pub struct ChangeGuard {
    last: Option<FileFingerprint>,
}

impl ChangeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint `path` and return it if it differs from the last commit.
    pub fn check(&self, path: &Path) -> Option<FileFingerprint> {
        let current = FileFingerprint::of(path);
        if self.last == Some(current) {
            None
        } else {
            Some(current)
        }
    }

    /// Record a processed fingerprint.
    pub fn commit(&mut self, fingerprint: FileFingerprint) {
        self.last = Some(fingerprint);
    }

    /// Forget the last fingerprint so the next check reports a change.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_guard_reports_first_sight_and_changes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Status.json");
        let mut guard = ChangeGuard::new();

        let missing = guard.check(&path).unwrap();
        assert!(missing.is_missing());
        guard.commit(missing);
        assert!(guard.check(&path).is_none());

        fs::write(&path, "{}").unwrap();
        let present = guard.check(&path).unwrap();
        guard.commit(present);
        assert!(guard.check(&path).is_none());

        fs::write(&path, "{\"a\":1}").unwrap();
        assert!(guard.check(&path).is_some());
    }

    #[test]
    fn test_uncommitted_change_is_reported_again() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Cargo.json");
        fs::write(&path, "{").unwrap();

        let guard = ChangeGuard::new();
        assert!(guard.check(&path).is_some());
        assert!(guard.check(&path).is_some());
    }
}
