//! Fleet carrier identification.
//!
//! Fleet carriers are named by a callsign such as `VZY-8XQ`. The journal
//! mostly reports only the callsign; the human-readable name shows up in the
//! sender string of the docking-granted message (`"Stormcrow VZY-8XQ"`) and in
//! the status file destination. [`CarrierDirectory`] remembers the last name
//! seen for each callsign.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Name shown when a carrier's name was never observed.
pub const UNKNOWN_CARRIER_NAME: &str = "Unknown Fleet Carrier";

fn carrier_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z0-9]{3}-[A-Z0-9]{3}$").expect("carrier id pattern is valid")
    })
}

/// Whether `s` is a fleet carrier callsign (three alphanumerics, a hyphen,
/// three alphanumerics).
pub fn is_carrier_id(s: &str) -> bool {
    carrier_id_pattern().is_match(s)
}

/// Split `"Stormcrow VZY-8XQ"` into `("Stormcrow", "VZY-8XQ")`.
///
/// Returns `None` unless the last word is a carrier callsign and something
/// precedes it.
pub fn split_carrier_name(full: &str) -> Option<(&str, &str)> {
    let trimmed = full.trim();
    let (name, id) = trimmed.rsplit_once(char::is_whitespace)?;
    if !is_carrier_id(id) {
        return None;
    }
    Some((name.trim(), id))
}

/// Callsign → last observed carrier name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarrierDirectory {
    names: HashMap<String, String>,
}

impl CarrierDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn from a docking-granted sender string. Always overwrites.
    ///
    /// Returns the callsign if the sender named a carrier.
    pub fn learn_from_sender(&mut self, sender: &str) -> Option<String> {
        let (name, id) = split_carrier_name(sender)?;
        self.names.insert(id.to_string(), name.to_string());
        Some(id.to_string())
    }

    /// Learn from a status-file destination name. Keeps an existing entry.
    pub fn learn_from_destination(&mut self, destination: &str) -> Option<String> {
        let (name, id) = split_carrier_name(destination)?;
        self.names
            .entry(id.to_string())
            .or_insert_with(|| name.to_string());
        Some(id.to_string())
    }

    /// The last name seen for a callsign.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_carrier_id() {
        assert!(is_carrier_id("VZY-8XQ"));
        assert!(is_carrier_id("K7Q-BQL"));
        assert!(!is_carrier_id("vzy-8xq"));
        assert!(!is_carrier_id("VZY8XQ"));
        assert!(!is_carrier_id("VZY-8XQ1"));
        assert!(!is_carrier_id("Jameson Memorial"));
    }

    #[test]
    fn test_split_carrier_name() {
        assert_eq!(
            split_carrier_name("Stormcrow VZY-8XQ"),
            Some(("Stormcrow", "VZY-8XQ"))
        );
        assert_eq!(
            split_carrier_name("  The Long Haul  K7Q-BQL "),
            Some(("The Long Haul", "K7Q-BQL"))
        );
        assert_eq!(split_carrier_name("VZY-8XQ"), None);
        assert_eq!(split_carrier_name("Jameson Memorial"), None);
    }

    #[test]
    fn test_sender_overwrites_destination_does_not() {
        let mut directory = CarrierDirectory::new();
        directory.learn_from_destination("Old Name VZY-8XQ");
        directory.learn_from_destination("Other Name VZY-8XQ");
        assert_eq!(directory.name_of("VZY-8XQ"), Some("Old Name"));

        directory.learn_from_sender("New Name VZY-8XQ");
        assert_eq!(directory.name_of("VZY-8XQ"), Some("New Name"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_non_carrier_sender_ignored() {
        let mut directory = CarrierDirectory::new();
        assert_eq!(directory.learn_from_sender("Jameson Memorial"), None);
        assert!(directory.is_empty());
    }
}
