//! Player state derived from the journal.
//!
//! [`PlayerState`] is the single snapshot the state machine mutates in place
//! and the page composer reads. It tracks where the player is, where the
//! plotted route leads, the locally selected destination and two timed flags:
//! the arrival banner and the startup splash.

use std::time::{Duration, Instant};

/// How long the arrival banner stays up without a new target.
pub const ARRIVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum time the splash page is shown after startup.
pub const SPLASH_MIN_DURATION: Duration = Duration::from_secs(10);

/// Where in a system the player is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationKind {
    /// Somewhere in the system, not close to any body.
    #[default]
    InSystem,
    /// In orbital cruise or flight near a planetary body.
    NearBody,
    /// Touched down on a planetary surface.
    Landed,
    /// Docked at a station, outpost or fleet carrier.
    Docked,
}

/// Surface coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The player's current location.
///
/// Coordinates are only reported while the kind is [`LocationKind::Landed`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Location {
    pub kind: LocationKind,
    pub system_address: u64,
    pub system_name: String,
    pub body: String,
    pub body_id: u32,
    pub body_type: String,
    coordinates: Option<Coordinates>,
}

impl Location {
    /// A fresh in-system location with no body information.
    pub fn in_system(system_address: u64, system_name: impl Into<String>) -> Self {
        Self {
            system_address,
            system_name: system_name.into(),
            ..Default::default()
        }
    }

    /// Surface coordinates, if landed.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self.kind {
            LocationKind::Landed => self.coordinates,
            _ => None,
        }
    }

    /// Mark the location as landed at the given coordinates.
    pub fn land(&mut self, coordinates: Coordinates) {
        self.kind = LocationKind::Landed;
        self.coordinates = Some(coordinates);
    }

    /// Leave the surface but stay near the body.
    pub fn lift_off(&mut self) {
        self.kind = LocationKind::NearBody;
        self.coordinates = None;
    }

    /// Approach a body in the current system.
    pub fn approach_body(&mut self, body: impl Into<String>, body_id: u32) {
        self.kind = LocationKind::NearBody;
        self.body = body.into();
        self.body_id = body_id;
        self.coordinates = None;
    }

    /// Move away from bodies while keeping the system and body fields.
    pub fn leave_body(&mut self) {
        self.kind = LocationKind::InSystem;
        self.coordinates = None;
    }

    /// Whether the player is docked at a named port.
    pub fn is_docked_at_port(&self) -> bool {
        self.kind == LocationKind::Docked && !self.body.is_empty()
    }

    /// Whether the location is tagged as a station (set on docking).
    pub fn is_station(&self) -> bool {
        self.body_type == "Station"
    }
}

/// The system targeted for the next hyperspace jump.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavTarget {
    pub system_name: String,
    pub system_address: u64,
    pub remaining_jumps: u32,
}

impl NavTarget {
    /// Whether a target is set.
    pub fn is_set(&self) -> bool {
        self.system_address != 0 || !self.system_name.is_empty()
    }

    /// Whether a jump into the given system reaches this target.
    ///
    /// Addresses are compared when both are known, names otherwise
    /// (case-insensitive). An empty target never matches.
    pub fn matches(&self, system_address: u64, system_name: &str) -> bool {
        if self.system_address != 0 && system_address != 0 {
            return self.system_address == system_address;
        }
        !self.system_name.is_empty()
            && !system_name.is_empty()
            && self.system_name.eq_ignore_ascii_case(system_name)
    }
}

/// The local destination selected in the galaxy or system map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Destination {
    pub system_address: u64,
    pub body_id: u32,
    pub name: String,
}

impl Destination {
    /// Whether a destination is set.
    pub fn is_set(&self) -> bool {
        self.system_address != 0
    }
}

/// Player state folded from journal events and the status file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub location: Location,
    pub nav_target: NavTarget,
    pub destination: Destination,
    arrived_at: Option<Instant>,
    splash_started: Option<Instant>,
}

impl PlayerState {
    /// Create a state with the splash screen raised at `started`.
    pub fn new(started: Instant) -> Self {
        Self {
            location: Location::default(),
            nav_target: NavTarget::default(),
            destination: Destination::default(),
            arrived_at: None,
            splash_started: Some(started),
        }
    }

    /// Whether the arrival banner is raised.
    pub fn has_arrived(&self) -> bool {
        self.arrived_at.is_some()
    }

    /// When the arrival banner was raised.
    pub fn arrived_at(&self) -> Option<Instant> {
        self.arrived_at
    }

    /// Whether the splash page is still shown.
    pub fn show_splash(&self) -> bool {
        self.splash_started.is_some()
    }

    /// Record a jump into a system. Raises the arrival banner and clears the
    /// nav target when the jump reaches it.
    ///
    /// Returns true if the jump completed the route.
    pub fn record_jump(&mut self, system_address: u64, system_name: &str, now: Instant) -> bool {
        if !self.nav_target.matches(system_address, system_name) {
            return false;
        }
        self.arrived_at = Some(now);
        self.nav_target = NavTarget::default();
        true
    }

    /// Store a new nav target; any previous arrival is superseded.
    pub fn set_nav_target(&mut self, target: NavTarget) {
        self.nav_target = target;
        self.arrived_at = None;
    }

    /// Drop the nav target and the arrival banner.
    pub fn clear_route(&mut self) {
        self.nav_target = NavTarget::default();
        self.arrived_at = None;
    }

    /// Store the local destination. A newly selected destination supersedes
    /// a prior arrival; re-reading the same destination does not.
    ///
    /// Returns true if the destination changed.
    pub fn set_destination(&mut self, destination: Destination) -> bool {
        if self.destination == destination {
            return false;
        }
        if destination.is_set() {
            self.arrived_at = None;
        }
        self.destination = destination;
        true
    }

    /// Clear the arrival banner once it timed out.
    ///
    /// New targets clear it as they are set, see [`Self::set_nav_target`]
    /// and [`Self::set_destination`].
    ///
    /// Returns true if the banner was cleared by this call.
    pub fn check_arrival(&mut self, now: Instant) -> bool {
        let Some(at) = self.arrived_at else {
            return false;
        };
        if now.saturating_duration_since(at) > ARRIVAL_TIMEOUT {
            self.arrived_at = None;
            return true;
        }
        false
    }

    /// Drop the splash once it has been up long enough and the first page
    /// has something to show.
    ///
    /// Returns true if the splash was cleared by this call.
    pub fn check_splash(&mut self, now: Instant, first_page_ready: bool) -> bool {
        let Some(started) = self.splash_started else {
            return false;
        };
        if now.saturating_duration_since(started) > SPLASH_MIN_DURATION && first_page_ready {
            self.splash_started = None;
            return true;
        }
        false
    }
}
