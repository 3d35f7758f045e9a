//! The cargo page: hold usage and contents sorted by display name.

use super::format::{fill_around, group_thousands, space_between};
use super::render::RenderContext;
use crate::journal::Session;

/// The cargo page has data once a cargo file was read, even an empty one.
pub fn is_ready(session: &Session) -> bool {
    session.cargo.is_some()
}

pub fn render(ctx: &RenderContext<'_>) -> Vec<String> {
    let session = ctx.session;
    let count = session.cargo.as_ref().map_or(0, |cargo| cargo.count);
    let mut lines = vec![format!(
        "CARGO: {:04}/{:04}",
        count,
        session.loadout.cargo_capacity()
    )];

    let Some(cargo) = &session.cargo else {
        lines.push(fill_around('*', " NO CRGO DATA "));
        return lines;
    };
    if cargo.is_empty() {
        lines.push(fill_around('*', " NO CARGO "));
        return lines;
    }

    let mut items: Vec<(&str, u32)> = cargo
        .inventory
        .iter()
        .map(|item| {
            (
                ctx.names
                    .resolve(&item.name, item.name_localised.as_deref()),
                item.count,
            )
        })
        .collect();
    items.sort_by(|a, b| a.0.cmp(b.0));

    lines.extend(
        items
            .into_iter()
            .map(|(name, count)| space_between(name, &group_thousands(i64::from(count)))),
    );
    lines
}
