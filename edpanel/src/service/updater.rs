//! One update pass: re-read files, fold them into the session, render and
//! hand the pages to the display gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::edsm::RemoteCache;
use crate::journal::{apply, find_current_journal, Applied, JournalTailer, Session};
use crate::logging::clean_path;
use crate::pages::{DisplayGate, PageComposer};
use crate::snapshot::{
    CargoReader, ModulesReader, SnapshotReader, SnapshotUpdate, StatusReader, FILE_CARGO,
    FILE_MODULES_INFO, FILE_STATUS,
};

/// What one update pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Journal lines read this pass.
    pub lines_read: usize,
    /// Lines that changed the session.
    pub lines_applied: usize,
    /// Snapshot files that changed the session.
    pub snapshots_changed: usize,
    /// System the remote cache was warmed for, if any.
    pub warmed_system: Option<u64>,
    /// Whether the display received a new page set.
    pub displayed: bool,
}

/// Owns the readers and drives the journal → session → pages pipeline.
///
/// Only the service's update task calls into this, so the session is never
/// written concurrently.
pub struct PanelUpdater {
    folder: PathBuf,
    tailer: JournalTailer,
    status: StatusReader,
    modules: ModulesReader,
    cargo: CargoReader,
    session: Arc<RwLock<Session>>,
    cache: Arc<RemoteCache>,
    composer: PageComposer,
    gate: DisplayGate,
}

impl PanelUpdater {
    pub fn new(
        folder: impl Into<PathBuf>,
        session: Arc<RwLock<Session>>,
        cache: Arc<RemoteCache>,
        composer: PageComposer,
        gate: DisplayGate,
    ) -> Self {
        Self {
            folder: folder.into(),
            tailer: JournalTailer::new(),
            status: StatusReader::new(),
            modules: ModulesReader::new(),
            cargo: CargoReader::new(),
            session,
            cache,
            composer,
            gate,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Re-read every changed file and fold it into the session.
    ///
    /// Never fails: I/O and parse errors are logged and retried on the next
    /// pass. Files are read before the session lock is taken. Returns the
    /// report without the display fields filled in.
    ///
    /// When one pass enters several systems, only the last one is warmed in
    /// the remote cache. Systems passed through on the way are still
    /// resolved on demand if a page needs them. Outside a Tokio runtime no
    /// warm-up is started.
    pub fn refresh_files(&mut self, now: Instant) -> UpdateReport {
        let mut report = UpdateReport::default();
        let mut entered_system = None;

        let lines = match find_current_journal(&self.folder) {
            Some(path) => match self.tailer.read_new_lines(&path) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(error = %e, "Failed to read journal");
                    Vec::new()
                }
            },
            None => {
                trace!(folder = %clean_path(&self.folder), "No journal found");
                Vec::new()
            }
        };
        let updates = self.read_snapshots();

        let mut session = self.session.write();
        report.lines_read = lines.len();
        for line in &lines {
            match apply(line, &mut session, now) {
                Applied::Ignored => {}
                Applied::Updated => report.lines_applied += 1,
                Applied::SystemChanged(address) => {
                    report.lines_applied += 1;
                    entered_system = Some(address);
                }
            }
        }
        for update in updates {
            if update.apply(&mut session) {
                report.snapshots_changed += 1;
            }
        }

        if session.player.check_arrival(now) {
            debug!("Arrival banner cleared");
        }
        let first_page_ready = self.composer.first_page_ready(&session);
        if session.player.check_splash(now, first_page_ready) {
            info!("Splash screen finished");
        }
        drop(session);

        if let Some(address) = entered_system {
            if self.cache.warm_up(address) {
                report.warmed_system = Some(address);
            }
        }
        report
    }

    /// Read the snapshot files that changed since the last pass.
    fn read_snapshots(&mut self) -> Vec<SnapshotUpdate> {
        let reads = [
            self.status.read(&self.folder.join(FILE_STATUS)),
            self.modules.read(&self.folder.join(FILE_MODULES_INFO)),
            self.cargo.read(&self.folder.join(FILE_CARGO)),
        ];
        reads
            .into_iter()
            .filter_map(|result| match result {
                Ok(update) => update,
                Err(e) => {
                    debug!(error = %e, "Snapshot not read, will retry");
                    None
                }
            })
            .collect()
    }

    /// Re-evaluate the timed flags without reading any file.
    ///
    /// Returns true if the arrival banner or splash screen ended.
    pub fn check_timers(&mut self, now: Instant) -> bool {
        let mut session = self.session.write();
        let arrival = session.player.check_arrival(now);
        let first_page_ready = self.composer.first_page_ready(&session);
        let splash = session.player.check_splash(now, first_page_ready);
        arrival || splash
    }

    /// Render from the current session and offer the pages to the display.
    pub async fn render(&mut self) -> bool {
        let snapshot = self.session.read().clone();
        let pages = self.composer.compose(&snapshot).await;
        match self.gate.submit(pages) {
            Ok(sent) => sent,
            Err(e) => {
                warn!(error = %e, "Display update failed");
                false
            }
        }
    }

    /// A full pass: files, then pages.
    pub async fn update(&mut self, now: Instant) -> UpdateReport {
        let mut report = self.refresh_files(now);
        report.displayed = self.render().await;
        if report.lines_applied > 0 || report.snapshots_changed > 0 {
            debug!(
                lines = report.lines_applied,
                snapshots = report.snapshots_changed,
                displayed = report.displayed,
                "Update pass"
            );
        }
        report
    }

    /// Forget what the display shows so the next render re-sends everything.
    pub fn reset_display(&mut self) {
        self.gate.reset();
    }
}
