//! Commodity display names.
//!
//! Cargo files carry internal commodity codes (`lowtemperaturediamond`). The
//! resolver maps them to display names using the EDCD commodity tables:
//!
//! - `commodity.csv`: symbol in column 1, name in column 3
//! - `rare_commodity.csv`: symbol in column 1, name in column 4
//!
//! The first row of each table is a header. Lookups are case-insensitive.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::logging::clean_path;

/// Table of regular commodities.
pub const COMMODITY_TABLE: &str = "commodity.csv";

/// Table of rare commodities.
pub const RARE_COMMODITY_TABLE: &str = "rare_commodity.csv";

/// Maps commodity codes to display names.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    names: HashMap<String, String>,
}

impl NameResolver {
    /// An empty resolver; every lookup falls back.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both tables from `dir`. Missing or unreadable tables are logged
    /// and skipped.
    pub fn load(dir: &Path) -> Self {
        let mut resolver = Self::new();
        for (file, symbol_col, name_col) in [(COMMODITY_TABLE, 1, 3), (RARE_COMMODITY_TABLE, 1, 4)] {
            let path = dir.join(file);
            match fs::read_to_string(&path) {
                Ok(text) => {
                    let added = resolver.add_table(&text, symbol_col, name_col);
                    debug!(file = %clean_path(&path), names = added, "Loaded commodity names");
                }
                Err(e) => {
                    warn!(file = %clean_path(&path), error = %e, "Commodity name table unavailable");
                }
            }
        }
        resolver
    }

    /// Add the rows of a CSV table. Returns the number of names added.
    pub fn add_table(&mut self, text: &str, symbol_col: usize, name_col: usize) -> usize {
        let mut added = 0;
        for line in text.lines().skip(1) {
            let fields = split_record(line);
            let (Some(symbol), Some(name)) = (fields.get(symbol_col), fields.get(name_col)) else {
                continue;
            };
            if symbol.is_empty() {
                continue;
            }
            self.names.insert(symbol.to_lowercase(), name.clone());
            added += 1;
        }
        added
    }

    /// Register a single name.
    pub fn insert(&mut self, symbol: &str, name: impl Into<String>) {
        self.names.insert(symbol.to_lowercase(), name.into());
    }

    /// Display name for `code`: the table entry, else the localised name the
    /// game supplied, else the raw code.
    pub fn resolve<'a>(&'a self, code: &'a str, localised: Option<&'a str>) -> &'a str {
        if let Some(name) = self.names.get(&code.to_lowercase()) {
            return name;
        }
        match localised {
            Some(name) if !name.is_empty() => name,
            _ => code,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Split one CSV record, honouring double-quoted fields with `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
