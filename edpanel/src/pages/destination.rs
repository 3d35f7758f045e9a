//! The destination page: where the player is heading.
//!
//! Precedence: arrival banner, local destination in the current system
//! (fleet carrier, station, body), the next route jump, then a placeholder.

use super::format::{centre, rule, space_between};
use super::render::{
    body_lines, find_station, fleet_carrier_lines, stations_or_empty, station_lines, system_lines,
    RenderContext,
};
use crate::journal::{is_carrier_id, split_carrier_name, LocationKind, Session};

/// Shown when neither a local destination nor a route is set.
pub const NO_DESTINATION: &str = " No Destination ";

/// The destination page has data once any target is known or the player is
/// docked somewhere.
pub fn is_ready(session: &Session) -> bool {
    let player = &session.player;
    player.destination.system_address != 0
        || player.nav_target.system_address != 0
        || (player.location.kind == LocationKind::Docked && !player.location.body.is_empty())
}

pub async fn render(ctx: &RenderContext<'_>) -> Vec<String> {
    let player = &ctx.session.player;

    if player.has_arrived() {
        return vec![rule(), centre("You have arrived"), rule()];
    }

    let destination = &player.destination;
    let location = &player.location;
    if destination.is_set()
        && destination.system_address == location.system_address
        && !destination.name.is_empty()
    {
        return local_destination(ctx).await;
    }

    let target = &player.nav_target;
    if target.system_address != 0 {
        return system_lines(
            ctx,
            "NEXT JUMP",
            &target.system_name,
            target.system_address,
            Some(target.remaining_jumps),
        )
        .await;
    }

    vec![NO_DESTINATION.to_string()]
}

/// A destination inside the current system.
async fn local_destination(ctx: &RenderContext<'_>) -> Vec<String> {
    let destination = &ctx.session.player.destination;
    let system_address = ctx.session.player.location.system_address;

    let carrier = match split_carrier_name(&destination.name) {
        Some((name, id)) => Some((id, Some(name))),
        None if is_carrier_id(&destination.name) => Some((
            destination.name.as_str(),
            ctx.session.carriers.name_of(&destination.name),
        )),
        None => None,
    };
    let stations = stations_or_empty(ctx.cache, system_address).await;
    if let Some((id, name)) = carrier {
        return fleet_carrier_lines("TGT FC", id, name, &stations);
    }
    if let Some(station) = find_station(&stations, &destination.name) {
        return station_lines("TGT PORT", station);
    }

    if destination.body_id != 0 {
        if let Ok(system) = ctx.cache.bodies(system_address).await {
            if let Some(body) = system.body_by_id(destination.body_id) {
                if body.is_landable {
                    return body_lines(
                        ctx.cache,
                        "TGT BODY",
                        system_address,
                        destination.body_id,
                        &destination.name,
                    )
                    .await;
                }
                let mut lines = vec![space_between("TGT BODY", &destination.name)];
                if !body.sub_type.is_empty() {
                    lines.push(body.sub_type.clone());
                }
                return lines;
            }
        }
    }

    vec![space_between("TGT BODY", &destination.name)]
}
