//! Page model.

use std::fmt;
use std::str::FromStr;

/// The closed set of pages the composer can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageKind {
    /// Local destination, route target or arrival banner.
    Destination,
    /// Current port, body or system.
    Location,
    /// Cargo hold contents.
    Cargo,
}

impl PageKind {
    /// Every page, in display order.
    pub const ALL: [PageKind; 3] = [PageKind::Destination, PageKind::Location, PageKind::Cargo];

    /// Configuration key of the page.
    pub fn key(&self) -> &'static str {
        match self {
            PageKind::Destination => "destination",
            PageKind::Location => "location",
            PageKind::Cargo => "cargo",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unrecognised page name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPage(pub String);

impl fmt::Display for UnknownPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown page '{}' (expected destination, location or cargo)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPage {}

impl FromStr for PageKind {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageKind::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// One rendered screen: an ordered list of text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    kind: PageKind,
    lines: Vec<String>,
}

impl Page {
    pub fn new(kind: PageKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    pub fn with_lines(kind: PageKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Append a line.
    pub fn add(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The full ordered set of pages handed to the display at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet {
    pages: Vec<Page>,
}

impl PageSet {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The rendered page of the given kind, if enabled.
    pub fn get(&self, kind: PageKind) -> Option<&Page> {
        self.pages.iter().find(|page| page.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
