//! Journal reading and the player-state machine.
//!
//! The game appends one JSON object per line to the session journal. This
//! module finds and tails that journal, decodes the events that matter and
//! folds them into a [`Session`].
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use edpanel::journal::{apply, Session};
//!
//! let now = Instant::now();
//! let mut session = Session::new(now);
//! apply(
//!     r#"{"event":"FSDTarget","SystemAddress":1000,"Name":"Sol","RemainingJumpsInRoute":2}"#,
//!     &mut session,
//!     now,
//! );
//! apply(
//!     r#"{"event":"FSDJump","StarSystem":"Sol","SystemAddress":1000}"#,
//!     &mut session,
//!     now,
//! );
//! assert!(session.player.has_arrived());
//! ```

mod carrier;
mod event;
mod machine;
mod session;
mod state;
mod tailer;

pub use carrier::{is_carrier_id, split_carrier_name, CarrierDirectory, UNKNOWN_CARRIER_NAME};
pub use event::{
    ApproachBodyEvent, ApproachSettlementEvent, DockedEvent, FsdTargetEvent, JournalEvent,
    LoadoutEvent, LocationEvent, ReceiveTextEvent, TouchdownEvent,
};
pub use machine::{apply, apply_event, Applied};
pub use session::Session;
pub use state::{
    Coordinates, Destination, Location, LocationKind, NavTarget, PlayerState, ARRIVAL_TIMEOUT,
    SPLASH_MIN_DURATION,
};
pub use tailer::{find_current_journal, JournalTailer, TailError, JOURNAL_PATTERN};
