//! The complete derived state of one reader session.

use std::time::Instant;

use super::carrier::CarrierDirectory;
use super::state::PlayerState;
use crate::snapshot::{CargoManifest, ModuleLoadout};

/// Everything the page composer reads: the player state plus the data learned
/// from auxiliary files and side channels.
///
/// Shared behind a read/write lock by the service. All writes happen on the
/// update task, one notification at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Location, route and timed flags.
    pub player: PlayerState,

    /// Fleet carrier callsign → name.
    pub carriers: CarrierDirectory,

    /// Cargo hold contents; `None` until a cargo file was read.
    pub cargo: Option<CargoManifest>,

    /// Installed modules and the authoritative cargo capacity.
    pub loadout: ModuleLoadout,

    /// Last system a remote warm-up was requested for.
    last_system_address: u64,
}

impl Session {
    /// Create a session whose splash screen starts at `started`.
    pub fn new(started: Instant) -> Self {
        Self {
            player: PlayerState::new(started),
            carriers: CarrierDirectory::new(),
            cargo: None,
            loadout: ModuleLoadout::default(),
            last_system_address: 0,
        }
    }

    /// Note that the player is now in `system_address`.
    ///
    /// Returns true when this is a different, known system.
    pub(crate) fn enter_system(&mut self, system_address: u64) -> bool {
        if system_address == 0 || system_address == self.last_system_address {
            return false;
        }
        self.last_system_address = system_address;
        true
    }
}
