//! Replay command - fold one journal into a fresh session, offline.
//!
//! Useful for checking what the panel would show for a recorded session
//! without the game running. Snapshot files next to the journal are read
//! too. EDSM is only queried with `--online`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use edpanel::edsm::{BoxFuture, RemoteCache, RemoteError, RemoteFetcher, ReqwestFetcher};
use edpanel::journal::{
    apply, Applied, JournalEvent, JournalTailer, LocationKind, Session, SPLASH_MIN_DURATION,
};
use edpanel::names::NameResolver;
use edpanel::pages::PageComposer;
use edpanel::service::ServiceError;
use edpanel::snapshot::{
    CargoReader, ModulesReader, SnapshotReader, StatusReader, FILE_CARGO, FILE_MODULES_INFO,
    FILE_STATUS,
};
use tracing::warn;

use super::common::load_config;
use crate::display::format_pages;
use crate::error::CliError;

/// Arguments for the replay command.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Journal file to read
    pub journal: PathBuf,

    /// Also query EDSM when rendering the pages
    #[arg(long)]
    pub online: bool,

    /// Only print the final state, not one line per applied event
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file to use instead of the default
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// A fetcher that never reaches the network.
#[derive(Debug, Default)]
pub struct OfflineFetcher;

impl RemoteFetcher for OfflineFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, RemoteError>> {
        Box::pin(async move { Err(RemoteError::Transport(format!("offline: {}", url))) })
    }
}

/// Line counts from folding a journal, plus one trace line per applied
/// event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayCounts {
    pub lines: usize,
    pub applied: usize,
    pub systems: usize,
    pub trace: Vec<String>,
    /// Snapshot files that exist but could not be read.
    pub snapshot_errors: Vec<String>,
}

/// `  12 FSDJump          Sol [InSystem]` for the state after line `number`.
pub fn format_state_line(number: usize, event: &str, session: &Session) -> String {
    let location = &session.player.location;
    let mut line = format!(
        "{:>5} {:<18} {} [{:?}]",
        number, event, location.system_name, location.kind
    );
    if !location.body.is_empty() {
        line.push_str(&format!(" {}", location.body));
    }
    if session.player.nav_target.is_set() {
        line.push_str(&format!(" -> {}", session.player.nav_target.system_name));
    }
    if session.player.has_arrived() {
        line.push_str(" (arrived)");
    }
    line
}

/// Fold `journal` and the snapshot files beside it into a new session.
pub fn replay_journal(journal: &Path, now: Instant) -> Result<(Session, ReplayCounts), CliError> {
    let lines = JournalTailer::new()
        .read_new_lines(journal)
        .map_err(|e| CliError::Journal(e.to_string()))?;

    let mut session = Session::new(now);
    let mut counts = ReplayCounts {
        lines: lines.len(),
        ..Default::default()
    };
    for (index, line) in lines.iter().enumerate() {
        let applied = apply(line, &mut session, now);
        if applied == Applied::Ignored {
            continue;
        }
        counts.applied += 1;
        if let Applied::SystemChanged(_) = applied {
            counts.systems += 1;
        }
        let event = JournalEvent::decode(line).map_or("?", |event| event.name());
        counts.trace.push(format_state_line(index + 1, event, &session));
    }

    if let Some(folder) = journal.parent() {
        let results = [
            StatusReader::new().refresh(&folder.join(FILE_STATUS), &mut session),
            ModulesReader::new().refresh(&folder.join(FILE_MODULES_INFO), &mut session),
            CargoReader::new().refresh(&folder.join(FILE_CARGO), &mut session),
        ];
        for error in results.into_iter().filter_map(Result::err) {
            warn!(error = %error, "Snapshot not read");
            counts.snapshot_errors.push(error.to_string());
        }
    }
    Ok((session, counts))
}

/// Describe the folded session in plain text.
pub fn format_summary(session: &Session, counts: &ReplayCounts) -> String {
    let player = &session.player;
    let location = &player.location;
    let mut out = String::new();

    out.push_str(&format!(
        "Lines:       {} read, {} applied, {} systems entered\n",
        counts.lines, counts.applied, counts.systems
    ));
    out.push_str(&format!(
        "System:      {} ({})\n",
        location.system_name, location.system_address
    ));
    let place = match location.kind {
        LocationKind::InSystem => "in system".to_string(),
        LocationKind::NearBody => format!("near {}", location.body),
        LocationKind::Landed => format!("landed on {}", location.body),
        LocationKind::Docked => format!("docked at {}", location.body),
    };
    out.push_str(&format!("Location:    {}\n", place));
    if player.nav_target.is_set() {
        out.push_str(&format!(
            "Next jump:   {} ({} jumps left)\n",
            player.nav_target.system_name, player.nav_target.remaining_jumps
        ));
    }
    if player.destination.is_set() {
        out.push_str(&format!("Destination: {}\n", player.destination.name));
    }
    out.push_str(&format!("Carriers:    {} known\n", session.carriers.len()));
    match &session.cargo {
        Some(cargo) => out.push_str(&format!(
            "Cargo:       {}/{} t in {} stacks\n",
            cargo.count,
            session.loadout.cargo_capacity(),
            cargo.inventory.len()
        )),
        None => out.push_str("Cargo:       (no cargo file)\n"),
    }
    for error in &counts.snapshot_errors {
        out.push_str(&format!("Warning:     {}\n", error));
    }
    out
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let service_config = config.to_service_config()?;

    let now = Instant::now();
    let (mut session, counts) = replay_journal(&args.journal, now)?;

    println!("Replay of {}", args.journal.display());
    println!();
    if !args.quiet {
        for line in &counts.trace {
            println!("{}", line);
        }
        println!();
    }
    print!("{}", format_summary(&session, &counts));

    let fetcher: Arc<dyn RemoteFetcher> = if args.online {
        let fetcher =
            ReqwestFetcher::new(service_config.edsm_timeout).map_err(ServiceError::from)?;
        Arc::new(fetcher)
    } else {
        Arc::new(OfflineFetcher)
    };
    let names = match &service_config.names_dir {
        Some(dir) => NameResolver::load(dir),
        None => NameResolver::new(),
    };
    let cache = Arc::new(RemoteCache::new(fetcher, service_config.edsm_base_url.clone()));
    let composer = PageComposer::new(&service_config.pages, cache, Arc::new(names))
        .with_min_body_value(service_config.min_body_value);

    // Show the pages as they look once the splash screen is over.
    let later = now + SPLASH_MIN_DURATION + Duration::from_secs(1);
    let ready = composer.first_page_ready(&session);
    session.player.check_splash(later, ready);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let pages = runtime.block_on(composer.compose(&session));

    println!();
    print!("{}", format_pages(&pages));
    Ok(())
}
