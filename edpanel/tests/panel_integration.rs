//! Integration tests for the journal → session → pages pipeline.
//!
//! These tests drive [`PanelUpdater`] over a temporary journal folder with a
//! canned EDSM fetcher:
//! - journal and snapshot files folded into one page set
//! - incremental tailing, truncation and journal rollover
//! - timed banners
//! - replaying a journal twice gives the same session
//! - chunked tailing gives the same session as reading a file at once
//!
//! Run with: `cargo test --test panel_integration`

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use filetime::FileTime;
use parking_lot::{Mutex, RwLock};
use proptest::prelude::*;
use tempfile::TempDir;

use edpanel::edsm::{BoxFuture, RemoteCache, RemoteError, RemoteFetcher};
use edpanel::journal::{apply, JournalTailer, Session};
use edpanel::names::NameResolver;
use edpanel::pages::{
    DisplayError, DisplayGate, DisplaySink, PageComposer, PageKind, PageSet, NO_DESTINATION,
};
use edpanel::service::PanelUpdater;
use edpanel::snapshot::rack_capacity;

// ============================================================================
// Helpers
// ============================================================================

const BASE: &str = "http://edsm.test";
const SOL: u64 = 10477373803;
const JOURNAL: &str = "Journal.2024-05-01T100000.01.log";

/// Serves fixed responses by URL; anything else is a 404.
#[derive(Default)]
struct CannedFetcher {
    responses: HashMap<String, String>,
}

impl CannedFetcher {
    fn with(mut self, path: &str, body: &str) -> Self {
        self.responses
            .insert(format!("{}/{}", BASE, path), body.to_string());
        self
    }
}

impl RemoteFetcher for CannedFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, RemoteError>> {
        let response = self.responses.get(url).cloned();
        Box::pin(async move {
            response
                .map(String::into_bytes)
                .ok_or_else(|| RemoteError::Status {
                    status: 404,
                    url: url.to_string(),
                })
        })
    }
}

fn sol_fetcher() -> CannedFetcher {
    CannedFetcher::default().with(
        &format!("api-system-v1/stations?systemId64={}", SOL),
        r#"{"stations":[
            {"id":1,"name":"Abraham Lincoln","type":"Orbis Starport",
             "allegiance":"Federation","distanceToArrival":505.0},
            {"id":2,"name":"K7Q-BQL","type":"Fleet Carrier",
             "allegiance":"Independent","distanceToArrival":12.0}
        ]}"#,
    )
}

#[derive(Default)]
struct RecordingSink {
    shown: Mutex<Vec<PageSet>>,
}

impl DisplaySink for RecordingSink {
    fn show(&self, pages: &PageSet) -> Result<(), DisplayError> {
        self.shown.lock().push(pages.clone());
        Ok(())
    }
}

impl RecordingSink {
    fn last(&self) -> PageSet {
        self.shown.lock().last().cloned().expect("nothing displayed")
    }
}

struct Harness {
    updater: PanelUpdater,
    session: Arc<RwLock<Session>>,
    sink: Arc<RecordingSink>,
    started: Instant,
}

fn harness(folder: &Path, fetcher: CannedFetcher) -> Harness {
    let started = Instant::now();
    let sink = Arc::new(RecordingSink::default());
    let cache = Arc::new(RemoteCache::new(Arc::new(fetcher), BASE));
    let composer = PageComposer::new(
        &PageKind::ALL,
        Arc::clone(&cache),
        Arc::new(NameResolver::new()),
    );
    let session = Arc::new(RwLock::new(Session::new(started)));
    let updater = PanelUpdater::new(
        folder,
        Arc::clone(&session),
        cache,
        composer,
        DisplayGate::new(sink.clone()),
    );
    Harness {
        updater,
        session,
        sink,
        started,
    }
}

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

fn lines_of(pages: &PageSet, kind: PageKind) -> Vec<String> {
    pages.get(kind).expect("page missing").lines().to_vec()
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_journal_and_snapshots_become_pages() {
    let temp = TempDir::new().unwrap();
    append(
        &temp.path().join(JOURNAL),
        &format!(
            concat!(
                "{{\"event\":\"FSDJump\",\"StarSystem\":\"Sol\",\"SystemAddress\":{0}}}\n",
                "{{\"event\":\"Docked\",\"StationName\":\"Abraham Lincoln\",",
                "\"StationType\":\"Orbis\",\"StarSystem\":\"Sol\",\"SystemAddress\":{0}}}\n",
            ),
            SOL
        ),
    );
    fs::write(
        temp.path().join("ModulesInfo.json"),
        r#"{"Modules":[
            {"Slot":"Slot01_Size6","Item":"Int_CargoRack_Size6_Class1"},
            {"Slot":"Slot02_Size6","Item":"int_cargorack_size6_class1"},
            {"Slot":"Slot03_Size5","Item":"int_shieldgenerator_size5_class2"}
        ]}"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("Cargo.json"),
        r#"{"Count":1204,"Inventory":[
            {"Name":"gold","Name_Localised":"Gold","Count":1200,"Stolen":0},
            {"Name":"bertrandite","Count":4,"Stolen":0}
        ]}"#,
    )
    .unwrap();

    let mut h = harness(temp.path(), sol_fetcher());
    let report = h.updater.update(h.started).await;
    assert_eq!(report.lines_applied, 2);
    assert_eq!(report.snapshots_changed, 2);
    assert_eq!(report.warmed_system, Some(SOL));
    assert!(report.displayed);

    let pages = h.sink.last();
    assert_eq!(
        lines_of(&pages, PageKind::Location),
        vec!["CURR PORT    FED", "Abraham Lincoln", "Orbis Starport"]
    );
    assert_eq!(
        lines_of(&pages, PageKind::Cargo),
        vec!["CARGO: 1204/0128", "Gold       1,200", "bertrandite    4"]
    );

    // The splash holds the first page until the minimum time has passed.
    let splash = lines_of(&pages, PageKind::Destination);
    assert!(splash[1].contains("EdPanel"));

    let report = h.updater.update(h.started + Duration::from_secs(11)).await;
    assert!(report.displayed);
    assert_eq!(
        lines_of(&h.sink.last(), PageKind::Destination),
        vec![NO_DESTINATION]
    );
}

#[tokio::test]
async fn test_docked_at_listed_carrier() {
    let temp = TempDir::new().unwrap();
    append(
        &temp.path().join(JOURNAL),
        &format!(
            concat!(
                "{{\"event\":\"ReceiveText\",\"From\":\"Dusty Rose K7Q-BQL\",",
                "\"Message\":\"$STATION_docking_granted;\",\"Channel\":\"npc\"}}\n",
                "{{\"event\":\"Docked\",\"StationName\":\"K7Q-BQL\",",
                "\"StationType\":\"FleetCarrier\",\"StarSystem\":\"Sol\",\"SystemAddress\":{0}}}\n",
            ),
            SOL
        ),
    );

    let mut h = harness(temp.path(), sol_fetcher());
    h.updater.update(h.started).await;

    let location = lines_of(&h.sink.last(), PageKind::Location);
    assert_eq!(location[0], "CURR FC  K7Q-BQL");
    assert_eq!(location[1], "Dusty Rose");
    assert_eq!(location[2], "Fleet Carrier");
}

#[tokio::test]
async fn test_edsm_outage_does_not_stop_updates() {
    let temp = TempDir::new().unwrap();
    append(
        &temp.path().join(JOURNAL),
        "{\"event\":\"FSDJump\",\"StarSystem\":\"Nowhere\",\"SystemAddress\":42}\n",
    );

    let mut h = harness(temp.path(), CannedFetcher::default());
    h.updater.update(h.started).await;
    let location = lines_of(&h.sink.last(), PageKind::Location);
    assert!(location[0].starts_with("CURR SYSTEM"));
    assert!(location.iter().any(|line| line.contains("NO EDSM DATA")));

    // Cargo still follows the snapshot file.
    fs::write(temp.path().join("Cargo.json"), r#"{"Count":0,"Inventory":[]}"#).unwrap();
    assert!(h.updater.update(h.started).await.displayed);
    assert_eq!(
        lines_of(&h.sink.last(), PageKind::Cargo)[1],
        "*** NO CARGO ***"
    );
}

// ============================================================================
// Tailing
// ============================================================================

#[test]
fn test_tailing_reads_each_line_once() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join(JOURNAL);
    append(&journal, "{\"event\":\"Loadout\",\"CargoCapacity\":8}\n");

    let mut h = harness(temp.path(), CannedFetcher::default());
    assert_eq!(h.updater.refresh_files(h.started).lines_read, 1);
    assert_eq!(h.updater.refresh_files(h.started).lines_read, 0);

    // A line caught mid-write waits for its newline.
    append(&journal, "{\"event\":\"Loadout\",");
    assert_eq!(h.updater.refresh_files(h.started).lines_read, 0);
    append(&journal, "\"CargoCapacity\":16}\n");
    assert_eq!(h.updater.refresh_files(h.started).lines_read, 1);
    assert_eq!(h.session.read().loadout.cargo_capacity(), 16);
}

#[test]
fn test_truncated_journal_is_read_from_start() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join(JOURNAL);
    append(
        &journal,
        "{\"event\":\"Loadout\",\"CargoCapacity\":8}\n{\"event\":\"Music\"}\n",
    );

    let mut h = harness(temp.path(), CannedFetcher::default());
    h.updater.refresh_files(h.started);

    fs::write(&journal, "{\"event\":\"Loadout\",\"CargoCapacity\":4}\n").unwrap();
    assert_eq!(h.updater.refresh_files(h.started).lines_read, 1);
    assert_eq!(h.session.read().loadout.cargo_capacity(), 4);
}

#[test]
fn test_newer_journal_takes_over() {
    let temp = TempDir::new().unwrap();
    let old = temp.path().join(JOURNAL);
    append(&old, "{\"event\":\"Loadout\",\"CargoCapacity\":8}\n");
    filetime::set_file_mtime(&old, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

    let mut h = harness(temp.path(), CannedFetcher::default());
    h.updater.refresh_files(h.started);

    let new = temp.path().join("Journal.2024-05-02T090000.01.log");
    append(&new, "{\"event\":\"Loadout\",\"CargoCapacity\":64}\n");
    filetime::set_file_mtime(&new, FileTime::from_unix_time(1_700_000_100, 0)).unwrap();

    assert_eq!(h.updater.refresh_files(h.started).lines_read, 1);
    assert_eq!(h.session.read().loadout.cargo_capacity(), 64);
}

// ============================================================================
// Timed banners
// ============================================================================

#[tokio::test]
async fn test_arrival_banner_times_out() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join(JOURNAL);
    append(
        &journal,
        concat!(
            "{\"event\":\"FSDTarget\",\"Name\":\"Sol\",\"SystemAddress\":10477373803,",
            "\"RemainingJumpsInRoute\":1}\n",
        ),
    );

    let mut h = harness(temp.path(), CannedFetcher::default());
    // Get past the splash first.
    let t0 = h.started + Duration::from_secs(11);
    h.updater.update(t0).await;

    append(
        &journal,
        "{\"event\":\"FSDJump\",\"StarSystem\":\"Sol\",\"SystemAddress\":10477373803}\n",
    );
    h.updater.update(t0).await;
    let banner = lines_of(&h.sink.last(), PageKind::Destination);
    assert!(banner.iter().any(|line| line.contains("You have arrived")));

    // Nothing new arrives; the timer alone ends the banner.
    assert!(!h.updater.check_timers(t0 + Duration::from_secs(5)));
    assert!(h.updater.check_timers(t0 + Duration::from_secs(11)));
    assert!(h.updater.render().await);
    assert_eq!(
        lines_of(&h.sink.last(), PageKind::Destination),
        vec![NO_DESTINATION]
    );
}

// ============================================================================
// Properties
// ============================================================================

fn journal_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u64..4).prop_map(|addr| format!(
            "{{\"event\":\"FSDJump\",\"StarSystem\":\"S{0}\",\"SystemAddress\":{0}}}",
            addr
        )),
        (1u64..4).prop_map(|addr| format!(
            "{{\"event\":\"FSDTarget\",\"Name\":\"S{0}\",\"SystemAddress\":{0},\"RemainingJumpsInRoute\":2}}",
            addr
        )),
        (0u32..20).prop_map(|id| format!(
            "{{\"event\":\"ApproachBody\",\"Body\":\"B{0}\",\"BodyID\":{0}}}",
            id
        )),
        Just("{\"event\":\"Touchdown\",\"Latitude\":1.5,\"Longitude\":-3.25}".to_string()),
        Just("{\"event\":\"Liftoff\"}".to_string()),
        Just("{\"event\":\"SupercruiseEntry\"}".to_string()),
        Just("{\"event\":\"NavRouteClear\"}".to_string()),
        (0u32..300).prop_map(|tons| format!(
            "{{\"event\":\"Loadout\",\"CargoCapacity\":{}}}",
            tons
        )),
        Just("{\"event\":\"Docked\",\"StationName\":\"Port\",\"StarSystem\":\"S1\",\"SystemAddress\":1}".to_string()),
        Just("{\"event\":\"ReceiveText\",\"From\":\"Dusty Rose K7Q-BQL\",\"Message\":\"$STATION_docking_granted;\",\"Channel\":\"npc\"}".to_string()),
        Just("{\"event\":\"Music\",\"MusicTrack\":\"Exploration\"}".to_string()),
        Just("not json at all".to_string()),
    ]
}

proptest! {
    /// Folding the same lines into two fresh sessions gives the same
    /// outcome for every line and the same final state.
    #[test]
    fn test_replay_is_deterministic(lines in prop::collection::vec(journal_line(), 0..40)) {
        let started = Instant::now();
        let fold = || {
            let mut session = Session::new(started);
            let outcomes: Vec<_> = lines
                .iter()
                .enumerate()
                .map(|(i, line)| apply(line, &mut session, started + Duration::from_secs(i as u64)))
                .collect();
            (session, outcomes)
        };

        let (first, first_outcomes) = fold();
        let (second, second_outcomes) = fold();
        prop_assert_eq!(first_outcomes, second_outcomes);
        prop_assert_eq!(first, second);
    }

    /// Tailing a journal written in arbitrary chunks, split even inside a
    /// line, folds to the same session as applying every line at once.
    #[test]
    fn test_chunked_tailing_matches_whole_read(
        lines in prop::collection::vec(journal_line(), 0..30),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let text: String = lines.iter().map(|line| format!("{}\n", line)).collect();
        let now = Instant::now();

        let mut expected = Session::new(now);
        for line in &lines {
            apply(line, &mut expected, now);
        }

        let mut points: Vec<usize> = cuts.iter().map(|cut| cut.index(text.len() + 1)).collect();
        points.push(text.len());
        points.sort_unstable();

        let temp = TempDir::new().unwrap();
        let journal = temp.path().join(JOURNAL);
        fs::write(&journal, "").unwrap();

        let mut tailer = JournalTailer::new();
        let mut actual = Session::new(now);
        let mut written = 0;
        for point in points {
            append(&journal, &text[written..point]);
            written = point;
            for line in tailer.read_new_lines(&journal).unwrap() {
                apply(&line, &mut actual, now);
            }
        }

        prop_assert_eq!(actual, expected);
    }

    /// Cargo capacity is the sum of the installed racks until the game
    /// reports a value.
    #[test]
    fn test_capacity_is_sum_of_racks(sizes in prop::collection::vec(1u32..=8, 0..10)) {
        let modules: Vec<String> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| format!(
                "{{\"Slot\":\"Slot{:02}\",\"Item\":\"int_cargorack_size{}_class1\"}}",
                i, size
            ))
            .collect();
        let expected: u32 = sizes.iter().map(|size| 1u32 << size).sum();
        prop_assert_eq!(
            expected,
            sizes
                .iter()
                .map(|size| rack_capacity(&format!("int_cargorack_size{}_class1", size)).unwrap())
                .sum::<u32>()
        );

        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("ModulesInfo.json"),
            format!("{{\"Modules\":[{}]}}", modules.join(",")),
        )
        .unwrap();

        let mut h = harness(temp.path(), CannedFetcher::default());
        h.updater.refresh_files(h.started);
        prop_assert_eq!(h.session.read().loadout.cargo_capacity(), expected);
    }
}
