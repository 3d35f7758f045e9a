//! `Status.json` integration: the locally selected destination.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::guard::{ChangeGuard, FileFingerprint};
use super::{SnapshotError, SnapshotReader, SnapshotUpdate};
use crate::journal::Destination;
use crate::logging::clean_path;

/// File name of the status snapshot.
pub const FILE_STATUS: &str = "Status.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatusFile {
    destination: Option<StatusDestination>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct StatusDestination {
    system: u64,
    body: u32,
    name: String,
    #[serde(rename = "Name_Localised")]
    name_localised: String,
}

impl StatusDestination {
    /// Prefer the plain name unless it is a `$`-prefixed localisation key.
    fn display_name(&self) -> String {
        if !self.name.is_empty() && !self.name.starts_with('$') {
            self.name.clone()
        } else if !self.name_localised.is_empty() {
            self.name_localised.clone()
        } else {
            self.name.clone()
        }
    }
}

/// Parse the destination out of status file contents.
///
/// A status without a `Destination` object yields an empty destination.
pub fn parse_destination(data: &[u8]) -> Result<Destination, serde_json::Error> {
    let status: StatusFile = serde_json::from_slice(data)?;
    Ok(status
        .destination
        .map(|d| Destination {
            system_address: d.system,
            body_id: d.body,
            name: d.display_name(),
        })
        .unwrap_or_default())
}

/// Reads the status file when it changes.
#[derive(Debug, Default)]
pub struct StatusReader {
    guard: ChangeGuard,
}

impl StatusReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotReader for StatusReader {
    /// A missing file leaves the destination as it was.
    fn read(&mut self, path: &Path) -> Result<Option<SnapshotUpdate>, SnapshotError> {
        let Some(fingerprint) = self.guard.check(path) else {
            return Ok(None);
        };
        if let FileFingerprint::Missing = fingerprint {
            self.guard.commit(fingerprint);
            return Ok(None);
        }

        let data = fs::read(path).map_err(|source| SnapshotError::Read {
            path: PathBuf::from(path),
            source,
        })?;
        // The game rewrites Status.json several times a second; an empty
        // read means we caught it mid-write.
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let destination = parse_destination(&data).map_err(|source| SnapshotError::Parse {
            path: PathBuf::from(path),
            source,
        })?;
        self.guard.commit(fingerprint);

        debug!(
            file = %clean_path(path),
            system = destination.system_address,
            body = destination.body_id,
            name = %destination.name,
            "Status destination read"
        );
        Ok(Some(SnapshotUpdate::Destination(destination)))
    }
}
