//! Renders the enabled pages from a session snapshot.

use std::sync::Arc;

use futures::future::join_all;

use super::format::{centre, rule};
use super::page::{Page, PageKind, PageSet};
use super::render::RenderContext;
use super::{cargo, destination, location};
use crate::edsm::{BoxFuture, RemoteCache};
use crate::journal::Session;
use crate::names::NameResolver;
use crate::{APP_NAME, VERSION};

type RenderFn = for<'a> fn(&'a RenderContext<'a>) -> BoxFuture<'a, Vec<String>>;

/// One row of the page table: how to tell if the page has data and how to
/// render it.
struct PageEntry {
    kind: PageKind,
    ready: fn(&Session) -> bool,
    render: RenderFn,
}

impl PageEntry {
    fn for_kind(kind: PageKind) -> Self {
        match kind {
            PageKind::Destination => PageEntry {
                kind,
                ready: destination::is_ready,
                render: render_destination,
            },
            PageKind::Location => PageEntry {
                kind,
                ready: location::is_ready,
                render: render_location,
            },
            PageKind::Cargo => PageEntry {
                kind,
                ready: cargo::is_ready,
                render: render_cargo,
            },
        }
    }
}

fn render_destination<'a>(ctx: &'a RenderContext<'a>) -> BoxFuture<'a, Vec<String>> {
    Box::pin(destination::render(ctx))
}

fn render_location<'a>(ctx: &'a RenderContext<'a>) -> BoxFuture<'a, Vec<String>> {
    Box::pin(location::render(ctx))
}

fn render_cargo<'a>(ctx: &'a RenderContext<'a>) -> BoxFuture<'a, Vec<String>> {
    Box::pin(async move { cargo::render(ctx) })
}

/// The splash block shown on the first page at startup.
pub fn splash_lines() -> Vec<String> {
    vec![rule(), centre(&format!("{} v{}", APP_NAME, VERSION)), rule()]
}

/// Renders the configured pages in display order.
///
/// Pages render concurrently; a slow EDSM lookup only delays its own page.
pub struct PageComposer {
    table: Vec<PageEntry>,
    cache: Arc<RemoteCache>,
    names: Arc<NameResolver>,
    min_body_value: i64,
}

impl PageComposer {
    /// Build the page table for `pages`, sorted into display order with
    /// duplicates removed.
    pub fn new(pages: &[PageKind], cache: Arc<RemoteCache>, names: Arc<NameResolver>) -> Self {
        let mut kinds = pages.to_vec();
        kinds.sort();
        kinds.dedup();
        Self {
            table: kinds.into_iter().map(PageEntry::for_kind).collect(),
            cache,
            names,
            min_body_value: 0,
        }
    }

    /// Only list valuable bodies worth at least `value` credits.
    pub fn with_min_body_value(mut self, value: i64) -> Self {
        self.min_body_value = value;
        self
    }

    /// Enabled pages in display order.
    pub fn pages(&self) -> Vec<PageKind> {
        self.table.iter().map(|entry| entry.kind).collect()
    }

    /// Whether the first enabled page has something to show, ending the
    /// splash screen.
    pub fn first_page_ready(&self, session: &Session) -> bool {
        self.table
            .first()
            .is_some_and(|entry| (entry.ready)(session))
    }

    /// Render every enabled page.
    pub async fn compose(&self, session: &Session) -> PageSet {
        let ctx = RenderContext {
            session,
            cache: &self.cache,
            names: &self.names,
            min_body_value: self.min_body_value,
        };
        let splash = session.player.show_splash();

        let renders = self.table.iter().enumerate().map(|(index, entry)| {
            let ctx = &ctx;
            async move {
                let lines = if index == 0 && splash {
                    splash_lines()
                } else {
                    (entry.render)(ctx).await
                };
                Page::with_lines(entry.kind, lines)
            }
        });
        PageSet::new(join_all(renders).await)
    }
}
