//! Console stand-in for the display device.

use std::io::{self, Write};

use edpanel::pages::{DisplayError, DisplaySink, Page, PageSet, LINE_WIDTH};

/// Draw one page inside an ASCII frame of the display's width.
pub fn format_page(page: &Page) -> String {
    let title = format!("- {} ", page.kind());
    let mut out = format!("+{:-<width$}+\n", title, width = LINE_WIDTH);
    for line in page.lines() {
        out.push_str(&format!("|{:<width$}|\n", line, width = LINE_WIDTH));
    }
    out.push_str(&format!("+{}+\n", "-".repeat(LINE_WIDTH)));
    out
}

/// Draw every page of a set, one after another.
pub fn format_pages(pages: &PageSet) -> String {
    pages.pages().iter().map(format_page).collect()
}

/// Prints each page set it receives to stdout.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn show(&self, pages: &PageSet) -> Result<(), DisplayError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout)?;
        stdout.write_all(format_pages(pages).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
