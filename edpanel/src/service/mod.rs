//! Panel service lifecycle.
//!
//! The service wires the readers, cache, composer and gate together and runs
//! two background tasks:
//!
//! ```text
//! FolderWatcher ──Notification──┐
//! update_now / reinitialize ────┼──► update task ──► PanelUpdater::update
//! timer tick ───────────────────┘
//! ```
//!
//! Update passes run one at a time on the update task. Readers of the
//! session take a read lock and never observe a half-applied pass.

mod config;
mod updater;
mod watcher;

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::edsm::{RemoteCache, RemoteCacheStats, RemoteError, RemoteFetcher, ReqwestFetcher};
use crate::journal::Session;
use crate::logging::clean_path;
use crate::names::NameResolver;
use crate::pages::{DisplayGate, DisplaySink, PageComposer};

pub use config::{ServiceConfig, DEFAULT_EDSM_TIMEOUT, DEFAULT_POLL_INTERVAL};
pub use updater::{PanelUpdater, UpdateReport};
pub use watcher::{FolderWatcher, Notification};

/// Interval at which the timed banners are re-checked without file changes.
pub const TIMER_INTERVAL: Duration = Duration::from_secs(1);

/// Capacity of the notification channel.
const CHANNEL_CAPACITY: usize = 32;

/// Errors starting or driving the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no pages enabled")]
    NoPagesEnabled,

    #[error("EDSM client error: {0}")]
    Remote(#[from] RemoteError),

    #[error("service is not running")]
    NotRunning,

    #[error("background task failed: {0}")]
    Task(String),
}

/// A running panel: watcher plus update task.
pub struct EdPanelService {
    session: Arc<RwLock<Session>>,
    cache: Arc<RemoteCache>,
    tx: mpsc::Sender<Notification>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EdPanelService {
    /// Start the service with the EDSM HTTP client.
    pub async fn start(
        config: ServiceConfig,
        display: Arc<dyn DisplaySink>,
        notifier: Option<Arc<dyn DisplaySink>>,
    ) -> Result<Self, ServiceError> {
        let fetcher = Arc::new(ReqwestFetcher::new(config.edsm_timeout)?);
        Self::start_with_fetcher(config, fetcher, display, notifier).await
    }

    /// Start the service with a custom fetcher.
    ///
    /// Runs one update pass before returning, so the display already shows
    /// the state on disk.
    pub async fn start_with_fetcher(
        config: ServiceConfig,
        fetcher: Arc<dyn RemoteFetcher>,
        display: Arc<dyn DisplaySink>,
        notifier: Option<Arc<dyn DisplaySink>>,
    ) -> Result<Self, ServiceError> {
        if config.pages.is_empty() {
            return Err(ServiceError::NoPagesEnabled);
        }

        let names = match &config.names_dir {
            Some(dir) => NameResolver::load(dir),
            None => NameResolver::new(),
        };
        let cache = Arc::new(RemoteCache::new(fetcher, config.edsm_base_url.clone()));
        let composer = PageComposer::new(&config.pages, Arc::clone(&cache), Arc::new(names))
            .with_min_body_value(config.min_body_value);
        let mut gate = DisplayGate::new(display);
        if let Some(notifier) = notifier {
            gate = gate.with_notifier(notifier);
        }

        let session = Arc::new(RwLock::new(Session::new(Instant::now())));
        let mut updater = PanelUpdater::new(
            config.journal_folder.clone(),
            Arc::clone(&session),
            Arc::clone(&cache),
            composer,
            gate,
        );

        info!(
            folder = %clean_path(&config.journal_folder),
            pages = ?config.pages,
            "Starting panel service"
        );
        // Baseline first: a file written during the initial pass is
        // reported by the watcher's first scan.
        let mut watcher = FolderWatcher::new(config.journal_folder, config.poll_interval);
        watcher.scan();

        let report = updater.update(Instant::now()).await;
        info!(
            lines = report.lines_read,
            system = ?report.warmed_system,
            "Initial state loaded"
        );

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();

        let tasks = vec![
            tokio::spawn(watcher.run(tx.clone(), shutdown.clone())),
            tokio::spawn(run_updates(updater, rx, shutdown.clone())),
        ];

        Ok(Self {
            session,
            cache,
            tx,
            shutdown,
            tasks,
        })
    }

    /// Shared read access to the current session.
    pub fn session(&self) -> Arc<RwLock<Session>> {
        Arc::clone(&self.session)
    }

    /// Sender for pushing notifications from outside the watcher.
    pub fn sender(&self) -> mpsc::Sender<Notification> {
        self.tx.clone()
    }

    pub fn cache_stats(&self) -> RemoteCacheStats {
        self.cache.stats()
    }

    /// Queue an update pass.
    pub async fn update_now(&self) -> Result<(), ServiceError> {
        self.tx
            .send(Notification::Refresh)
            .await
            .map_err(|_| ServiceError::NotRunning)
    }

    /// The display was re-initialised: drop cached lookups and re-send all
    /// pages on the next pass.
    pub async fn device_reinitialized(&self) -> Result<(), ServiceError> {
        self.cache.flush();
        self.tx
            .send(Notification::Reinitialize)
            .await
            .map_err(|_| ServiceError::NotRunning)
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// A token that stops the service when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop both tasks and wait for them.
    pub async fn stop(mut self) -> Result<(), ServiceError> {
        info!("Stopping panel service");
        self.shutdown.cancel();
        let mut result = Ok(());
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                result = Err(ServiceError::Task(e.to_string()));
            }
        }
        info!(cache = %self.cache.stats(), "Panel service stopped");
        result
    }
}

impl Drop for EdPanelService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_updates(
    mut updater: PanelUpdater,
    mut rx: mpsc::Receiver<Notification>,
    shutdown: CancellationToken,
) {
    let mut timer = tokio::time::interval(TIMER_INTERVAL);
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            notification = rx.recv() => {
                let Some(notification) = notification else { break };
                match notification {
                    Notification::FilesChanged(paths) => {
                        debug!(count = paths.len(), "Files changed");
                    }
                    Notification::Refresh => debug!("Update requested"),
                    Notification::Reinitialize => {
                        info!("Display re-initialised, resending pages");
                        updater.reset_display();
                    }
                }
                updater.update(Instant::now()).await;
            }

            _ = timer.tick() => {
                if updater.check_timers(Instant::now()) {
                    updater.render().await;
                }
            }
        }
    }
    debug!("Update task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edsm::MockFetcher;
    use crate::pages::{DisplayError, PageKind, PageSet};
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSink {
        shown: parking_lot::Mutex<Vec<PageSet>>,
    }

    impl DisplaySink for RecordingSink {
        fn show(&self, pages: &PageSet) -> Result<(), DisplayError> {
            self.shown.lock().push(pages.clone());
            Ok(())
        }
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.shown.lock().len()
        }
    }

    async fn wait_for(sink: &RecordingSink, count: usize) {
        for _ in 0..200 {
            if sink.count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("display never reached {} updates", count);
    }

    fn config(folder: &std::path::Path) -> ServiceConfig {
        ServiceConfig::new(folder)
            .with_pages([PageKind::Location, PageKind::Cargo])
            .with_edsm_base_url("http://edsm.test")
            .with_poll_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_start_renders_initial_state() {
        let temp = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let service = EdPanelService::start_with_fetcher(
            config(temp.path()),
            Arc::new(MockFetcher::default()),
            sink.clone(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(sink.count(), 1);
        assert!(service.is_running());
        service.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_pages_is_rejected() {
        let temp = TempDir::new().unwrap();
        let result = EdPanelService::start_with_fetcher(
            config(temp.path()).with_pages([]),
            Arc::new(MockFetcher::default()),
            Arc::new(RecordingSink::default()),
            None,
        )
        .await;
        assert!(matches!(result, Err(ServiceError::NoPagesEnabled)));
    }

    #[tokio::test]
    async fn test_file_change_reaches_display() {
        let temp = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let service = EdPanelService::start_with_fetcher(
            config(temp.path()),
            Arc::new(MockFetcher::default()),
            sink.clone(),
            None,
        )
        .await
        .unwrap();

        fs::write(
            temp.path().join("Cargo.json"),
            r#"{"Count":4,"Inventory":[{"Name":"gold","Count":4,"Stolen":0}]}"#,
        )
        .unwrap();
        wait_for(&sink, 2).await;
        assert!(service.session().read().cargo.is_some());
        // Splash stays on the first page, cargo renders on the second.
        let shown = sink.shown.lock();
        assert_eq!(shown[1].pages()[1].lines()[0], "CARGO: 0004/0000");
        drop(shown);

        service.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_reinitialize_resends_pages() {
        let temp = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let service = EdPanelService::start_with_fetcher(
            config(temp.path()),
            Arc::new(MockFetcher::default()),
            sink.clone(),
            None,
        )
        .await
        .unwrap();

        service.update_now().await.unwrap();
        service.device_reinitialized().await.unwrap();
        wait_for(&sink, 2).await;

        let shown = sink.shown.lock();
        assert_eq!(shown[0], shown[1]);
        drop(shown);
        service.stop().await.unwrap();
    }

    /// Writes the cargo file while the first page set is being shown.
    struct CargoWritingSink {
        folder: std::path::PathBuf,
        inner: RecordingSink,
    }

    impl DisplaySink for CargoWritingSink {
        fn show(&self, pages: &PageSet) -> Result<(), DisplayError> {
            if self.inner.count() == 0 {
                fs::write(
                    self.folder.join("Cargo.json"),
                    r#"{"Count":2,"Inventory":[{"Name":"gold","Count":2,"Stolen":0}]}"#,
                )?;
            }
            self.inner.show(pages)
        }
    }

    #[tokio::test]
    async fn test_change_during_initial_pass_is_picked_up() {
        let temp = TempDir::new().unwrap();
        let sink = Arc::new(CargoWritingSink {
            folder: temp.path().to_path_buf(),
            inner: RecordingSink::default(),
        });
        let service = EdPanelService::start_with_fetcher(
            config(temp.path()),
            Arc::new(MockFetcher::default()),
            sink.clone(),
            None,
        )
        .await
        .unwrap();

        wait_for(&sink.inner, 2).await;
        let shown = sink.inner.shown.lock();
        assert_eq!(shown[1].pages()[1].lines()[0], "CARGO: 0002/0000");
        drop(shown);
        service.stop().await.unwrap();
    }
}
