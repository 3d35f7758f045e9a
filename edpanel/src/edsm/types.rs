//! Records returned by the EDSM `api-system-v1` endpoints.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// EDSM sends `null` for fields it knows nothing about.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The system-level endpoints cached by [`super::RemoteCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemQuery {
    /// Body list with gravity, landability and materials.
    Bodies,
    /// Scan and mapping value estimates plus valuable bodies.
    EstimatedValue,
}

impl SystemQuery {
    /// Path of the endpoint below the service base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SystemQuery::Bodies => "api-system-v1/bodies",
            SystemQuery::EstimatedValue => "api-system-v1/estimated-value",
        }
    }
}

impl fmt::Display for SystemQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemQuery::Bodies => write!(f, "bodies"),
            SystemQuery::EstimatedValue => write!(f, "estimated-value"),
        }
    }
}

/// A star system as described by EDSM.
///
/// Both system endpoints return this shape; each fills in its own subset of
/// fields. An `id64` of zero means EDSM has no data for the system.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSystem {
    #[serde(deserialize_with = "null_as_default")]
    pub id64: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub estimated_value: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub estimated_value_mapped: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub bodies: Vec<RemoteBody>,
    #[serde(deserialize_with = "null_as_default")]
    pub valuable_bodies: Vec<ValuableBody>,
}

impl RemoteSystem {
    /// Decode an endpoint response. EDSM answers `[]` or `{}` for systems it
    /// does not know; both decode to an empty system.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice::<serde_json::Value>(data)? {
            value @ serde_json::Value::Object(_) => serde_json::from_value(value),
            _ => Ok(Self::default()),
        }
    }

    /// Whether EDSM returned anything for this system.
    pub fn has_data(&self) -> bool {
        self.id64 != 0
    }

    /// The primary star, if listed.
    pub fn main_star(&self) -> Option<&RemoteBody> {
        self.bodies.iter().find(|body| body.is_main_star)
    }

    /// Look up a body by its in-system body id.
    pub fn body_by_id(&self, body_id: u32) -> Option<&RemoteBody> {
        self.bodies.iter().find(|body| body.body_id == body_id)
    }

    /// Strip the system name prefix from a body name (`Sol 3` → `3`).
    pub fn short_name<'a>(&self, body_name: &'a str) -> &'a str {
        match body_name.strip_prefix(self.name.as_str()) {
            Some(rest) if !self.name.is_empty() && !rest.is_empty() => rest.trim_start(),
            _ => body_name,
        }
    }
}

/// One body in a system.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteBody {
    #[serde(deserialize_with = "null_as_default")]
    pub id64: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub body_id: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sub_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_main_star: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_scoopable: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_landable: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub gravity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub volcanism_type: String,
    /// Material name → percentage.
    #[serde(deserialize_with = "null_as_default")]
    pub materials: BTreeMap<String, f64>,
}

impl RemoteBody {
    /// Materials by percentage, highest first; equal shares by name.
    pub fn materials_sorted(&self) -> Vec<Material> {
        let mut materials: Vec<Material> = self
            .materials
            .iter()
            .map(|(name, percentage)| Material {
                name: name.clone(),
                percentage: *percentage,
            })
            .collect();
        materials.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.name.cmp(&b.name))
        });
        materials
    }
}

/// A material and its share of a body's surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub percentage: f64,
}

/// A body worth scanning, from the estimated-value endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuableBody {
    #[serde(deserialize_with = "null_as_default")]
    pub body_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value_max: i64,
}

/// A station or fleet carrier in a system.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteStation {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub allegiance: String,
    #[serde(deserialize_with = "null_as_default")]
    pub distance_to_arrival: f64,
}

impl RemoteStation {
    /// Whether EDSM lists this station as a fleet carrier.
    pub fn is_fleet_carrier(&self) -> bool {
        self.kind == "Fleet Carrier"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StationsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub stations: Vec<RemoteStation>,
}

impl StationsResponse {
    pub(crate) fn from_slice(data: &[u8]) -> Result<Vec<RemoteStation>, serde_json::Error> {
        match serde_json::from_slice::<serde_json::Value>(data)? {
            value @ serde_json::Value::Object(_) => {
                Ok(serde_json::from_value::<StationsResponse>(value)?.stations)
            }
            _ => Ok(Vec::new()),
        }
    }
}
