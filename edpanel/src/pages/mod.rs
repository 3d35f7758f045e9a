//! Page composition and the display change gate.
//!
//! Each enabled [`PageKind`] renders to a fixed-width [`Page`]. The
//! [`PageComposer`] renders all of them into a [`PageSet`]; the
//! [`DisplayGate`] forwards the set only when it differs from the last one
//! shown.
//!
//! ```text
//! Session ──► PageComposer ──► PageSet ──► DisplayGate ──► DisplaySink
//!                 │                                   └──► notifier (optional)
//!                 └── RemoteCache lookups
//! ```

mod cargo;
mod composer;
mod destination;
mod format;
mod gate;
mod location;
mod page;
mod render;

pub use composer::{splash_lines, PageComposer};
pub use destination::NO_DESTINATION;
pub use format::{centre, fill_around, group_thousands, space_between, title_case, LINE_WIDTH};
pub use gate::{DisplayError, DisplayGate, DisplaySink};
pub use page::{Page, PageKind, PageSet, UnknownPage};
pub use render::{allegiance_abbreviation, StarType, FLEET_CARRIER_TYPE};
