//! `Cargo.json` integration: the cargo hold manifest.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::guard::{ChangeGuard, FileFingerprint};
use super::{SnapshotError, SnapshotReader, SnapshotUpdate};

/// File name of the cargo snapshot.
pub const FILE_CARGO: &str = "Cargo.json";

/// One commodity stack in the hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CargoItem {
    /// Internal commodity code, e.g. `lowtemperaturediamond`.
    pub name: String,
    pub count: u32,
    pub stolen: u32,
    #[serde(rename = "Name_Localised")]
    pub name_localised: Option<String>,
}

/// Contents of the cargo hold as last written by the game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CargoManifest {
    pub count: u32,
    pub inventory: Vec<CargoItem>,
}

impl CargoManifest {
    /// Whether the hold is confirmed empty.
    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }
}

/// Reads the cargo snapshot when it changes.
#[derive(Debug, Default)]
pub struct CargoReader {
    guard: ChangeGuard,
}

impl CargoReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotReader for CargoReader {
    /// A missing file clears the cargo to "no data" (`None`), which is
    /// distinct from a file listing zero items.
    fn read(&mut self, path: &Path) -> Result<Option<SnapshotUpdate>, SnapshotError> {
        let Some(fingerprint) = self.guard.check(path) else {
            return Ok(None);
        };
        if let FileFingerprint::Missing = fingerprint {
            self.guard.commit(fingerprint);
            debug!("No cargo file found");
            return Ok(Some(SnapshotUpdate::Cargo(None)));
        }

        let data = fs::read(path).map_err(|source| SnapshotError::Read {
            path: PathBuf::from(path),
            source,
        })?;
        let manifest: CargoManifest =
            serde_json::from_slice(&data).map_err(|source| SnapshotError::Parse {
                path: PathBuf::from(path),
                source,
            })?;
        self.guard.commit(fingerprint);

        debug!(
            count = manifest.count,
            stacks = manifest.inventory.len(),
            "Cargo snapshot read"
        );
        Ok(Some(SnapshotUpdate::Cargo(Some(manifest))))
    }
}
