//! `ModulesInfo.json` integration: installed modules and cargo capacity.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::trace;

use super::guard::{ChangeGuard, FileFingerprint};
use super::{SnapshotError, SnapshotReader, SnapshotUpdate};

/// File name of the module snapshot.
pub const FILE_MODULES_INFO: &str = "ModulesInfo.json";

/// Cargo rack item codes and the tonnage each provides.
const CARGO_RACKS: &[(&str, u32)] = &[
    ("int_cargorack_size1_class1", 2),
    ("int_cargorack_size2_class1", 4),
    ("int_cargorack_size3_class1", 8),
    ("int_cargorack_size4_class1", 16),
    ("int_cargorack_size5_class1", 32),
    ("int_cargorack_size6_class1", 64),
    ("int_cargorack_size7_class1", 128),
    ("int_largecargorack_size7_class1", 192),
    ("int_cargorack_size8_class1", 256),
    ("int_largecargorack_size8_class1", 384),
];

/// Tonnage provided by a module, if it is a cargo rack.
pub fn rack_capacity(item: &str) -> Option<u32> {
    CARGO_RACKS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(item))
        .map(|(_, tons)| *tons)
}

/// One installed module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleSlot {
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub item: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ModulesFile {
    modules: Vec<ModuleSlot>,
}

/// The ship's modules and cargo capacity.
///
/// The capacity reported by a `Loadout` journal event is authoritative; once
/// one was seen, rack summation is no longer consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleLoadout {
    modules: Vec<ModuleSlot>,
    reported_capacity: Option<u32>,
}

impl ModuleLoadout {
    pub fn modules(&self) -> &[ModuleSlot] {
        &self.modules
    }

    /// Replace the installed module list.
    pub fn set_modules(&mut self, modules: Vec<ModuleSlot>) {
        self.modules = modules;
    }

    /// Record the capacity reported by the game.
    pub fn set_reported_capacity(&mut self, capacity: u32) {
        self.reported_capacity = Some(capacity);
    }

    /// The capacity reported by the game, if any.
    pub fn reported_capacity(&self) -> Option<u32> {
        self.reported_capacity
    }

    /// Total cargo capacity in tons.
    pub fn cargo_capacity(&self) -> u32 {
        if let Some(capacity) = self.reported_capacity {
            return capacity;
        }
        self.modules
            .iter()
            .filter_map(|module| {
                let tons = rack_capacity(&module.item);
                trace!(slot = %module.slot, item = %module.item, ?tons, "Module capacity");
                tons
            })
            .sum()
    }
}

/// Reads the module snapshot when it changes.
#[derive(Debug, Default)]
pub struct ModulesReader {
    guard: ChangeGuard,
}

impl ModulesReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotReader for ModulesReader {
    /// A missing file keeps the previous module list.
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
        let file: ModulesFile =
            serde_json::from_slice(&data).map_err(|source| SnapshotError::Parse {
                path: PathBuf::from(path),
                source,
            })?;
        self.guard.commit(fingerprint);
        Ok(Some(SnapshotUpdate::Modules(file.modules)))
    }
}
