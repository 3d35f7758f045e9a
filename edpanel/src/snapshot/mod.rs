//! Whole-file snapshots the game keeps next to the journal.
//!
//! Unlike the journal these files are rewritten in place. Each reader keeps a
//! [`ChangeGuard`] so an unchanged file is never parsed twice:
//!
//! | File               | Updates                          | Missing file       |
//! |--------------------|----------------------------------|--------------------|
//! | `Status.json`      | local destination, carrier names | ignored            |
//! | `ModulesInfo.json` | module list (cargo capacity)     | ignored            |
//! | `Cargo.json`       | cargo manifest                   | cargo = no data    |
//!
//! Reading and applying are split: [`SnapshotReader::read`] does the file
//! I/O without touching the session, [`SnapshotUpdate::apply`] folds the
//! result in under whatever lock the caller holds.

mod cargo;
mod guard;
mod modules;
mod status;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::journal::{Destination, Session};

pub use cargo::{CargoItem, CargoManifest, CargoReader, FILE_CARGO};
pub use guard::{ChangeGuard, FileFingerprint};
pub use modules::{rack_capacity, ModuleLoadout, ModuleSlot, ModulesReader, FILE_MODULES_INFO};
pub use status::{parse_destination, StatusReader, FILE_STATUS};

/// Errors reading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The parsed contents of one changed snapshot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotUpdate {
    /// `Status.json`: the local destination.
    Destination(Destination),
    /// `ModulesInfo.json`: the installed modules.
    Modules(Vec<ModuleSlot>),
    /// `Cargo.json`: the manifest, `None` once the file is gone.
    Cargo(Option<CargoManifest>),
}

impl SnapshotUpdate {
    /// Fold the update into the session.
    ///
    /// Returns true if the session changed.
    pub fn apply(self, session: &mut Session) -> bool {
        match self {
            SnapshotUpdate::Destination(destination) => {
                if let Some(id) = session.carriers.learn_from_destination(&destination.name) {
                    debug!(carrier = %id, "Destination is a fleet carrier");
                }
                session.player.set_destination(destination)
            }
            SnapshotUpdate::Modules(modules) => {
                session.loadout.set_modules(modules);
                debug!(
                    modules = session.loadout.modules().len(),
                    capacity = session.loadout.cargo_capacity(),
                    "Module snapshot updated"
                );
                true
            }
            SnapshotUpdate::Cargo(cargo) => {
                let changed = session.cargo != cargo;
                session.cargo = cargo;
                changed
            }
        }
    }
}

/// A snapshot file that is only parsed when it changed.
pub trait SnapshotReader {
    /// Read the file at `path` if it changed since the last successful read.
    ///
    /// A failed read or parse is retried on the next call.
    fn read(&mut self, path: &Path) -> Result<Option<SnapshotUpdate>, SnapshotError>;

    /// Read the file and apply it to the session in one step.
    ///
    /// Returns true if the session changed.
    fn refresh(&mut self, path: &Path, session: &mut Session) -> Result<bool, SnapshotError> {
        Ok(self
            .read(path)?
            .is_some_and(|update| update.apply(session)))
    }
}
