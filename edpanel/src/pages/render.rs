//! Line templates shared by the location and destination pages.

use std::sync::Arc;

use tracing::debug;

use super::format::{fill_around, group_thousands, space_between, title_case};
use crate::edsm::{RemoteCache, RemoteStation};
use crate::journal::{Session, UNKNOWN_CARRIER_NAME};
use crate::names::NameResolver;

/// Station type shown when EDSM does not list a carrier.
pub const FLEET_CARRIER_TYPE: &str = "Fleet Carrier";

/// Everything a renderer reads.
pub struct RenderContext<'a> {
    /// Snapshot taken under the state read lock.
    pub session: &'a Session,
    pub cache: &'a RemoteCache,
    pub names: &'a NameResolver,
    /// Valuable bodies below this estimated value are not listed.
    pub min_body_value: i64,
}

/// Headers that carry the fuel-star indicator.
const FUEL_HEADERS: [&str; 2] = ["NEXT JUMP", "CURR SYSTEM"];

/// Short allegiance tag for the station header.
pub fn allegiance_abbreviation(allegiance: &str) -> &str {
    match allegiance.to_ascii_lowercase().as_str() {
        "federation" => "FED",
        "empire" => "EMP",
        "alliance" => "ALLI",
        "independent" => "IND",
        _ => allegiance,
    }
}

/// Star class and description from an EDSM subtype.
///
/// `K (Yellow-Orange) Star` gives class `K`, description
/// `Yellow-Orange Star`. Subtypes without a parenthesised part keep their
/// full text as the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarType {
    pub class: String,
    pub description: String,
}

impl StarType {
    pub fn parse(sub_type: &str) -> Self {
        let class = sub_type.split_whitespace().next().unwrap_or_default();
        let description = match (sub_type.find('('), sub_type.find(')')) {
            (Some(open), Some(close)) if open < close => {
                format!("{} Star", sub_type[open + 1..close].trim())
            }
            _ => sub_type.trim().to_string(),
        };
        Self {
            class: class.to_string(),
            description,
        }
    }
}

/// Stations in a system, or an empty list if EDSM is unavailable.
pub async fn stations_or_empty(cache: &RemoteCache, system_address: u64) -> Arc<Vec<RemoteStation>> {
    match cache.stations(system_address).await {
        Ok(stations) => stations,
        Err(e) => {
            debug!(system = system_address, error = %e, "Station list unavailable");
            Arc::new(Vec::new())
        }
    }
}

/// Find a station by name, ignoring case.
pub fn find_station<'s>(stations: &'s [RemoteStation], name: &str) -> Option<&'s RemoteStation> {
    stations
        .iter()
        .find(|station| station.name.eq_ignore_ascii_case(name))
}

/// `header  ALLEGIANCE` / name / type.
pub fn station_lines(header: &str, station: &RemoteStation) -> Vec<String> {
    vec![
        space_between(header, allegiance_abbreviation(&station.allegiance)),
        station.name.clone(),
        station.kind.clone(),
    ]
}

/// `header  CALLSIGN` / carrier name / type.
pub fn fleet_carrier_lines(
    header: &str,
    id: &str,
    name: Option<&str>,
    stations: &[RemoteStation],
) -> Vec<String> {
    let kind = find_station(stations, id)
        .map(|station| station.kind.clone())
        .unwrap_or_else(|| FLEET_CARRIER_TYPE.to_string());
    let name = name
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_CARRIER_NAME);
    vec![space_between(header, id), name.to_string(), kind]
}

/// Gravity, type and materials of one body.
pub async fn body_lines(
    cache: &RemoteCache,
    header: &str,
    system_address: u64,
    body_id: u32,
    body_name: &str,
) -> Vec<String> {
    let system = match cache.bodies(system_address).await {
        Ok(system) => system,
        Err(e) => {
            debug!(system = system_address, error = %e, "Body page without EDSM data");
            return vec![fill_around('*', " EDSM ERROR ")];
        }
    };
    let Some(body) = system.body_by_id(body_id) else {
        return vec![fill_around('*', " NO BODY DATA ")];
    };

    let mut lines = vec![
        space_between(header, &format!("{:.2}G", body.gravity)),
        body_name.to_string(),
        title_case(&body.sub_type),
        fill_around('*', " MATERIAL "),
    ];
    lines.extend(
        body.materials_sorted()
            .into_iter()
            .map(|m| space_between(&format!("{:5.2}%", m.percentage), &m.name)),
    );
    lines
}

/// Star, body count, value estimates and valuable bodies of a system.
///
/// `jumps` is shown next to the star class when given.
pub async fn system_lines(
    ctx: &RenderContext<'_>,
    header: &str,
    system_name: &str,
    system_address: u64,
    jumps: Option<u32>,
) -> Vec<String> {
    let (bodies, values) = futures::join!(
        ctx.cache.bodies(system_address),
        ctx.cache.system_value(system_address)
    );
    let (system, values) = match (bodies, values) {
        (Ok(system), Ok(values)) => (system, values),
        (Err(e), _) | (_, Err(e)) => {
            debug!(system = system_address, error = %e, "System page without EDSM data");
            return vec![header.to_string(), fill_around('*', " NO EDSM DATA ")];
        }
    };

    let main_star = system.main_star();
    let mut lines = Vec::new();
    if FUEL_HEADERS.contains(&header) && main_star.is_some_and(|star| star.is_scoopable) {
        lines.push(space_between(header, "FUEL"));
    } else {
        lines.push(header.to_string());
    }
    lines.push(system_name.to_string());

    let star = StarType::parse(main_star.map(|star| star.sub_type.as_str()).unwrap_or_default());
    let jumps = jumps.map(|j| format!("J:{}", j)).unwrap_or_default();
    lines.push(space_between(&format!("CLS:{}", star.class), &jumps));
    lines.push(star.description);

    lines.push(space_between(
        "Bodies:",
        &group_thousands(i64::from(system.body_count)),
    ));
    lines.push(space_between(
        "Scan:",
        &format!("{}cr", group_thousands(values.estimated_value)),
    ));
    lines.push(space_between(
        "Map:",
        &format!("{}cr", group_thousands(values.estimated_value_mapped)),
    ));

    let valuable: Vec<_> = values
        .valuable_bodies
        .iter()
        .filter(|body| body.value_max >= ctx.min_body_value)
        .collect();
    if !valuable.is_empty() {
        lines.push(fill_around('*', " VAL BODIES "));
        for body in valuable {
            lines.push(space_between(
                system.short_name(&body.body_name),
                &format!("{}cr", group_thousands(body.value_max)),
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(name: &str, kind: &str, allegiance: &str) -> RemoteStation {
        RemoteStation {
            name: name.to_string(),
            kind: kind.to_string(),
            allegiance: allegiance.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_allegiance_abbreviation() {
        assert_eq!(allegiance_abbreviation("Federation"), "FED");
        assert_eq!(allegiance_abbreviation("EMPIRE"), "EMP");
        assert_eq!(allegiance_abbreviation("Alliance"), "ALLI");
        assert_eq!(allegiance_abbreviation("Independent"), "IND");
        assert_eq!(allegiance_abbreviation("Thargoid"), "Thargoid");
        assert_eq!(allegiance_abbreviation(""), "");
    }

    #[test]
    fn test_star_type_parse() {
        let star = StarType::parse("K (Yellow-Orange) Star");
        assert_eq!(star.class, "K");
        assert_eq!(star.description, "Yellow-Orange Star");

        let star = StarType::parse("Neutron Star");
        assert_eq!(star.class, "Neutron");
        assert_eq!(star.description, "Neutron Star");

        let star = StarType::parse("");
        assert_eq!(star.class, "");
        assert_eq!(star.description, "");
    }

    #[test]
    fn test_station_lines() {
        let lines = station_lines(
            "CURR PORT",
            &station("Abraham Lincoln", "Orbis Starport", "Federation"),
        );
        assert_eq!(
            lines,
            vec!["CURR PORT    FED", "Abraham Lincoln", "Orbis Starport"]
        );
    }

    #[test]
    fn test_fleet_carrier_lines() {
        let stations = vec![station("k7q-bql", "Drake-Class Carrier", "")];
        let lines = fleet_carrier_lines("TGT FC", "K7Q-BQL", Some("Stormcrow"), &stations);
        assert_eq!(lines, vec!["TGT FC   K7Q-BQL", "Stormcrow", "Drake-Class Carrier"]);

        let lines = fleet_carrier_lines("CURR FC", "VZY-8XQ", None, &[]);
        assert_eq!(lines[1], UNKNOWN_CARRIER_NAME);
        assert_eq!(lines[2], FLEET_CARRIER_TYPE);
    }
}
