//! Incremental, rotation-aware reading of the primary journal.
//!
//! The game writes one journal per session into the journal folder, named
//! `Journal.<timestamp>.<part>.log`. The reader follows the newest one and
//! only ever reads the bytes appended since the previous call.
//!
//! # Offset Rules
//!
//! - Same file as last time: continue from the recorded offset.
//! - Different file: start from zero.
//! - File shorter than the recorded offset (truncated or replaced): start
//!   from zero.
//! - A trailing partial line is left unread until its newline arrives.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, trace};

use crate::logging::clean_path;

/// File name pattern of journal files inside the journal folder.
pub const JOURNAL_PATTERN: &str = "Journal.*.*.log";

/// Errors reading the journal.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("failed to open journal {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to read journal {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// Find the journal the game is currently writing.
///
/// Picks the file matching [`JOURNAL_PATTERN`] with the newest modification
/// time. Equal times fall back to the greatest file name, which embeds the
/// session timestamp, so the choice is stable between calls.
pub fn find_current_journal(folder: &Path) -> Option<PathBuf> {
    let pattern = folder
        .join(JOURNAL_PATTERN)
        .to_string_lossy()
        .into_owned();
    let escaped = escape_folder(folder, &pattern);

    let entries = match glob::glob(&escaped) {
        Ok(paths) => paths,
        Err(e) => {
            debug!(folder = %clean_path(folder), error = %e, "Invalid journal pattern");
            return None;
        }
    };

    let newest = entries
        .filter_map(Result::ok)
        .filter_map(|path| {
            let modified = path.metadata().ok()?.modified().ok()?;
            Some((modified, path))
        })
        .max_by(|a, b| compare_candidates(a, b));

    let path = newest.map(|(_, path)| path);
    if let Some(ref path) = path {
        debug!(journal = %clean_path(path), "Found most recent journal file");
    }
    path
}

/// Escape glob metacharacters in the folder part of `pattern`.
fn escape_folder(folder: &Path, pattern: &str) -> String {
    let folder_str = folder.to_string_lossy();
    match pattern.strip_prefix(folder_str.as_ref()) {
        Some(rest) => format!("{}{}", glob::Pattern::escape(&folder_str), rest),
        None => pattern.to_string(),
    }
}

fn compare_candidates(a: &(SystemTime, PathBuf), b: &(SystemTime, PathBuf)) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| a.1.file_name().cmp(&b.1.file_name()))
}

/// Reads appended journal lines, tracking the file and offset between calls.
#[derive(Debug, Default)]
pub struct JournalTailer {
    path: Option<PathBuf>,
    offset: u64,
}

impl JournalTailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The file and offset of the last successful read.
    pub fn position(&self) -> Option<(&Path, u64)> {
        self.path.as_deref().map(|p| (p, self.offset))
    }

    /// Forget the recorded position; the next read starts from zero.
    pub fn reset(&mut self) {
        self.path = None;
        self.offset = 0;
    }

    /// Read the complete lines appended to `path` since the last call.
    ///
    /// On error the recorded position is left untouched so the next
    /// notification retries the same range.
    pub fn read_new_lines(&mut self, path: &Path) -> Result<Vec<String>, TailError> {
        let mut file = File::open(path).map_err(|source| TailError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let read_err = |source| TailError::Read {
            path: path.to_path_buf(),
            source,
        };

        let len = file.metadata().map_err(read_err)?.len();
        let mut offset = match self.path.as_deref() {
            Some(previous) if previous == path => self.offset,
            _ => 0,
        };
        if offset > len {
            debug!(
                journal = %clean_path(path),
                offset,
                len,
                "Journal shrank, reading from the start"
            );
            offset = 0;
        }

        file.seek(SeekFrom::Start(offset)).map_err(read_err)?;
        let mut buf = Vec::with_capacity((len - offset) as usize);
        file.read_to_end(&mut buf).map_err(read_err)?;

        let consumed = buf
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);

        let lines: Vec<String> = buf[..consumed]
            .split(|&b| b == b'\n')
            .map(|raw| raw.strip_suffix(b"\r").unwrap_or(raw))
            .filter(|raw| !raw.is_empty())
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .collect();

        self.path = Some(path.to_path_buf());
        self.offset = offset + consumed as u64;

        trace!(
            journal = %clean_path(path),
            lines = lines.len(),
            offset = self.offset,
            "Read journal lines"
        );
        Ok(lines)
    }
}
