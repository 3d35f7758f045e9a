//! EdPanel - live Elite Dangerous status pages for auxiliary displays
//!
//! This library tails the game's journal folder, folds journal events into a
//! single player-state snapshot, enriches that snapshot with cached EDSM
//! lookups and renders a small set of fixed-width text pages whenever the
//! derived state changes.
//!
//! # Architecture
//!
//! ```text
//! change notification
//!        │
//!        ▼
//! ┌──────────────┐   lines   ┌───────────────┐
//! │ JournalTailer│──────────►│ apply (event) │──┐
//! └──────────────┘           └───────────────┘  │   ┌──────────┐
//! ┌──────────────┐                              ├──►│ Session  │ (RwLock)
//! │  Snapshots   │ Status / ModulesInfo / Cargo ┘   └────┬─────┘
//! └──────────────┘                                       │ read
//!                                                        ▼
//!                 ┌───────────┐  resolve   ┌──────────────────┐
//!                 │RemoteCache│◄───────────│   PageComposer   │
//!                 └───────────┘            └────────┬─────────┘
//!                                                   ▼
//!                                          ┌──────────────────┐
//!                                          │   DisplayGate    │──► DisplaySink
//!                                          └──────────────────┘
//! ```

pub mod config;
pub mod edsm;
pub mod journal;
pub mod logging;
pub mod names;
pub mod pages;
pub mod service;
pub mod snapshot;

/// Library version, shown on the splash page.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name used in banners and log output.
pub const APP_NAME: &str = "EdPanel";
