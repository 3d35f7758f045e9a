//! Run command - watch the journal folder and show pages until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use edpanel::logging::{clean_path, init_logging};
use edpanel::pages::PageKind;
use edpanel::service::EdPanelService;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::load_config;
use crate::display::ConsoleDisplay;
use crate::error::CliError;

/// Arguments for the run command.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Journal folder (overrides [journal] folder)
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// Pages to show, comma separated (destination, location, cargo)
    #[arg(long, value_delimiter = ',')]
    pub pages: Option<Vec<PageKind>>,

    /// Log level directive (overrides [logging] level)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also log to the console
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file to use instead of the default
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;

    // CLI takes precedence over the file
    if let Some(folder) = args.folder {
        config.journal_folder = folder;
    }
    if let Some(pages) = args.pages {
        config.destination_page = pages.contains(&PageKind::Destination);
        config.location_page = pages.contains(&PageKind::Location);
        config.cargo_page = pages.contains(&PageKind::Cargo);
    }
    let level = args.log_level.unwrap_or_else(|| config.log_level.clone());

    let service_config = config.to_service_config()?;
    let log_dir = config.log_directory()?;
    let _logging = init_logging(&level, &log_dir, args.verbose).map_err(CliError::Logging)?;
    info!(version = edpanel::VERSION, "{} starting", edpanel::APP_NAME);

    println!("{} v{}", edpanel::APP_NAME, edpanel::VERSION);
    println!("================");
    println!();
    println!("Journal: {}", clean_path(&service_config.journal_folder));
    println!(
        "Pages:   {}",
        service_config
            .pages
            .iter()
            .map(PageKind::key)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Logs:    {}", clean_path(&log_dir));
    println!();
    println!("Press Ctrl+C to exit");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        signal.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    runtime.block_on(async {
        let service =
            EdPanelService::start(service_config, Arc::new(ConsoleDisplay), None).await?;
        shutdown.cancelled().await;

        let stats = service.cache_stats();
        service.stop().await?;

        println!();
        println!("Session Summary");
        println!("───────────────");
        println!("  EDSM lookups: {}", stats);
        Ok::<(), CliError>(())
    })?;

    info!("{} stopped", edpanel::APP_NAME);
    Ok(())
}
