//! Structured decoding of journal lines.
//!
//! Every journal line is a JSON object with an `event` discriminator. Only the
//! events that influence the player state are decoded into typed records;
//! everything else collapses into [`JournalEvent::Unknown`]. A line that is not
//! valid JSON, or whose known event carries mistyped fields, decodes to `None`.

use serde::Deserialize;

/// A journal event relevant to the player state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event")]
pub enum JournalEvent {
    /// Written at startup and after respawns; a full location fix.
    Location(LocationEvent),

    /// Entered supercruise; the player is no longer near a body.
    SupercruiseEntry {},

    /// Dropped out of supercruise; carries the same fields as `Location`.
    SupercruiseExit(LocationEvent),

    /// Completed a hyperspace jump into a new system.
    #[serde(rename = "FSDJump")]
    FsdJump(LocationEvent),

    /// Landed on a planetary surface.
    Touchdown(TouchdownEvent),

    /// Lifted off from a planetary surface.
    Liftoff {},

    /// A new hyperspace target (next jump of a plotted route) was selected.
    #[serde(rename = "FSDTarget")]
    FsdTarget(FsdTargetEvent),

    /// The plotted route was cleared.
    NavRouteClear {},

    /// Entered orbital cruise around a body.
    ApproachBody(ApproachBodyEvent),

    /// Approached a surface settlement.
    ApproachSettlement(ApproachSettlementEvent),

    /// Ship loadout summary.
    Loadout(LoadoutEvent),

    /// In-game text message.
    ReceiveText(ReceiveTextEvent),

    /// Docked at a station or fleet carrier.
    Docked(DockedEvent),

    /// Any event this reader does not track.
    #[serde(other)]
    Unknown,
}

impl JournalEvent {
    /// Decode a single journal line.
    ///
    /// Returns `None` for blank or malformed lines.
    pub fn decode(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        serde_json::from_str(line).ok()
    }

    /// Short event name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            JournalEvent::Location(_) => "Location",
            JournalEvent::SupercruiseEntry {} => "SupercruiseEntry",
            JournalEvent::SupercruiseExit(_) => "SupercruiseExit",
            JournalEvent::FsdJump(_) => "FSDJump",
            JournalEvent::Touchdown(_) => "Touchdown",
            JournalEvent::Liftoff {} => "Liftoff",
            JournalEvent::FsdTarget(_) => "FSDTarget",
            JournalEvent::NavRouteClear {} => "NavRouteClear",
            JournalEvent::ApproachBody(_) => "ApproachBody",
            JournalEvent::ApproachSettlement(_) => "ApproachSettlement",
            JournalEvent::Loadout(_) => "Loadout",
            JournalEvent::ReceiveText(_) => "ReceiveText",
            JournalEvent::Docked(_) => "Docked",
            JournalEvent::Unknown => "Unknown",
        }
    }
}

/// Fields shared by `Location`, `SupercruiseExit` and `FSDJump`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LocationEvent {
    pub star_system: String,
    pub system_address: u64,
    pub body: String,
    #[serde(rename = "BodyID")]
    pub body_id: u32,
    pub body_type: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub docked: bool,
    pub station_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TouchdownEvent {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FsdTargetEvent {
    pub name: String,
    pub system_address: u64,
    pub remaining_jumps_in_route: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApproachBodyEvent {
    pub body: String,
    #[serde(rename = "BodyID")]
    pub body_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApproachSettlementEvent {
    pub body_name: String,
    #[serde(rename = "BodyID")]
    pub body_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoadoutEvent {
    pub cargo_capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReceiveTextEvent {
    pub from: String,
    pub message: String,
    pub channel: String,
}

impl ReceiveTextEvent {
    /// Whether this is the NPC message sent when docking is granted.
    pub fn is_docking_granted(&self) -> bool {
        self.channel == "npc" && self.message.ends_with("docking_granted;")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DockedEvent {
    pub station_name: String,
    pub station_type: String,
    pub star_system: String,
    pub system_address: u64,
}
