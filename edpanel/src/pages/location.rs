//! The location page: where the player is right now.
//!
//! Precedence: docked at a fleet carrier, docked at a known station, near or
//! on a body, then the system summary.

use super::render::{
    body_lines, find_station, fleet_carrier_lines, stations_or_empty, station_lines, system_lines,
    RenderContext,
};
use crate::journal::{is_carrier_id, LocationKind, Session};

/// The location page has data once any system is known.
pub fn is_ready(session: &Session) -> bool {
    session.player.location.system_address != 0
}

pub async fn render(ctx: &RenderContext<'_>) -> Vec<String> {
    let location = &ctx.session.player.location;

    if location.is_docked_at_port() && location.is_station() {
        let stations = stations_or_empty(ctx.cache, location.system_address).await;
        let listed = find_station(&stations, &location.body);
        let is_carrier = is_carrier_id(&location.body)
            || listed.is_some_and(|station| station.is_fleet_carrier());
        if is_carrier {
            return fleet_carrier_lines(
                "CURR FC",
                &location.body,
                ctx.session.carriers.name_of(&location.body),
                &stations,
            );
        }
        if let Some(station) = listed {
            return station_lines("CURR PORT", station);
        }
    }

    match location.kind {
        LocationKind::NearBody | LocationKind::Landed => {
            body_lines(
                ctx.cache,
                "CURR BODY",
                location.system_address,
                location.body_id,
                &location.body,
            )
            .await
        }
        _ => {
            system_lines(
                ctx,
                "CURR SYSTEM",
                &location.system_name,
                location.system_address,
                None,
            )
            .await
        }
    }
}
