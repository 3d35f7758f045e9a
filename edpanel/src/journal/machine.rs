//! The journal event state machine.
//!
//! [`apply`] folds one journal line into a [`Session`]. It never fails:
//! malformed lines and events this reader does not track are no-ops. Each
//! recognised event applies one narrow mutation; location fixes rebuild the
//! location from scratch so fields never leak across a location change.

use std::time::Instant;

use tracing::trace;

use super::event::{DockedEvent, FsdTargetEvent, JournalEvent, LocationEvent};
use super::session::Session;
use super::state::{Coordinates, Location, LocationKind, NavTarget};

/// Outcome of applying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Malformed line or untracked event; nothing changed.
    Ignored,
    /// The session was updated.
    Updated,
    /// The session was updated and the player is now in a different system.
    ///
    /// Carries the new system address so the caller can warm remote caches.
    SystemChanged(u64),
}

impl Applied {
    /// Whether the line changed anything.
    pub fn is_update(&self) -> bool {
        !matches!(self, Applied::Ignored)
    }
}

/// Fold a raw journal line into the session.
pub fn apply(line: &str, session: &mut Session, now: Instant) -> Applied {
    match JournalEvent::decode(line) {
        Some(event) => apply_event(&event, session, now),
        None => Applied::Ignored,
    }
}

/// Fold a decoded journal event into the session.
pub fn apply_event(event: &JournalEvent, session: &mut Session, now: Instant) -> Applied {
    trace!(event = event.name(), "Applying journal event");

    match event {
        JournalEvent::Location(fix) | JournalEvent::SupercruiseExit(fix) => {
            relocate(fix, session)
        }
        JournalEvent::FsdJump(fix) => {
            let applied = relocate(fix, session);
            if session
                .player
                .record_jump(fix.system_address, &fix.star_system, now)
            {
                trace!(system = %fix.star_system, "Arrived at route target");
            }
            applied
        }
        JournalEvent::SupercruiseEntry {} => {
            session.player.location.leave_body();
            Applied::Updated
        }
        JournalEvent::Touchdown(touchdown) => {
            session.player.location.land(Coordinates {
                latitude: touchdown.latitude,
                longitude: touchdown.longitude,
            });
            Applied::Updated
        }
        JournalEvent::Liftoff {} => {
            session.player.location.lift_off();
            Applied::Updated
        }
        JournalEvent::FsdTarget(target) => {
            session.player.set_nav_target(nav_target(target));
            Applied::Updated
        }
        JournalEvent::NavRouteClear {} => {
            session.player.clear_route();
            Applied::Updated
        }
        JournalEvent::ApproachBody(approach) => {
            session
                .player
                .location
                .approach_body(approach.body.clone(), approach.body_id);
            Applied::Updated
        }
        JournalEvent::ApproachSettlement(approach) => {
            session
                .player
                .location
                .approach_body(approach.body_name.clone(), approach.body_id);
            Applied::Updated
        }
        JournalEvent::Loadout(loadout) => match loadout.cargo_capacity {
            Some(capacity) => {
                session.loadout.set_reported_capacity(capacity);
                Applied::Updated
            }
            None => Applied::Ignored,
        },
        JournalEvent::ReceiveText(text) if text.is_docking_granted() => {
            match session.carriers.learn_from_sender(&text.from) {
                Some(id) => {
                    trace!(carrier = %id, "Learned fleet carrier name");
                    Applied::Updated
                }
                None => Applied::Ignored,
            }
        }
        JournalEvent::ReceiveText(_) => Applied::Ignored,
        JournalEvent::Docked(docked) => {
            session.player.location = docked_location(docked);
            Applied::Updated
        }
        JournalEvent::Unknown => Applied::Ignored,
    }
}

/// Replace the location with a fresh fix.
fn relocate(fix: &LocationEvent, session: &mut Session) -> Applied {
    session.player.location = location_from_fix(fix);
    if session.enter_system(fix.system_address) {
        Applied::SystemChanged(fix.system_address)
    } else {
        Applied::Updated
    }
}

fn location_from_fix(fix: &LocationEvent) -> Location {
    let mut location = Location::in_system(fix.system_address, fix.star_system.clone());

    if fix.body_type == "Planet" {
        location.approach_body(fix.body.clone(), fix.body_id);
        location.body_type = fix.body_type.clone();
        if let Some(latitude) = fix.latitude {
            location.land(Coordinates {
                latitude,
                longitude: fix.longitude.unwrap_or_default(),
            });
        }
    }

    if fix.docked {
        location.kind = LocationKind::Docked;
        if !fix.station_name.is_empty() {
            location.body = fix.station_name.clone();
            location.body_id = 0;
            location.body_type = "Station".to_string();
        }
    }

    location
}

fn docked_location(docked: &DockedEvent) -> Location {
    let mut location = Location::in_system(docked.system_address, docked.star_system.clone());
    location.kind = LocationKind::Docked;
    location.body = docked.station_name.clone();
    location.body_id = 0;
    location.body_type = "Station".to_string();
    location
}

fn nav_target(target: &FsdTargetEvent) -> NavTarget {
    let remaining_jumps = if target.system_address != 0 {
        target.remaining_jumps_in_route.unwrap_or(0)
    } else {
        0
    };
    NavTarget {
        system_name: target.name.clone(),
        system_address: target.system_address,
        remaining_jumps,
    }
}
