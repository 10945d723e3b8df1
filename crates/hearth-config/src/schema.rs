// Persisted configuration snapshot.
//
// The host platform stores one versioned record per device: the four
// discovered dictionaries, the user's four selection lists, connection
// details, and behaviour flags. The JSON field names below are the
// persisted schema; `keys` mirrors them for the migration code, which
// works on loose maps because older versions predate some fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hearth_core::EndpointRecord;

use crate::ConfigError;
use crate::migrate::ConfigData;

/// Field names of the persisted schema (current version).
pub mod keys {
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const FLOAT_DICT: &str = "float_dict";
    pub const SWITCHES_DICT: &str = "switches_dict";
    pub const TEXT_DICT: &str = "text_dict";
    pub const WRITABLE_DICT: &str = "writable_dict";
    pub const CHOSEN_FLOAT_SENSORS: &str = "chosen_float_sensors";
    pub const CHOSEN_SWITCHES: &str = "chosen_switches";
    pub const CHOSEN_TEXT_SENSORS: &str = "chosen_text_sensors";
    pub const CHOSEN_WRITABLE_SENSORS: &str = "chosen_writable_sensors";
    pub const FORCE_LEGACY_MODE: &str = "force_legacy_mode";
    pub const IGNORE_DECIMAL_OVERRIDES: &str = "ignore_decimal_overrides";
}

/// Typed view of a current-version persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedConfig {
    pub host: String,
    pub port: u16,

    pub float_dict: BTreeMap<String, EndpointRecord>,
    pub switches_dict: BTreeMap<String, EndpointRecord>,
    pub text_dict: BTreeMap<String, EndpointRecord>,
    pub writable_dict: BTreeMap<String, EndpointRecord>,

    pub chosen_float_sensors: Vec<String>,
    pub chosen_switches: Vec<String>,
    pub chosen_text_sensors: Vec<String>,
    pub chosen_writable_sensors: Vec<String>,

    pub force_legacy_mode: bool,
    #[serde(default)]
    pub ignore_decimal_overrides: Vec<String>,
}

impl PersistedConfig {
    /// Parse a current-version data map into the typed view.
    pub fn from_data(data: &ConfigData) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(serde_json::Value::Object(
            data.clone(),
        ))?)
    }

    /// Serialize back to the loose map the host persists.
    pub fn to_data(&self) -> Result<ConfigData, ConfigError> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => unreachable!("struct always serializes to an object"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn typed_view_round_trips_through_the_loose_map() {
        let config = PersistedConfig {
            host: "192.168.0.25".into(),
            port: 8080,
            float_dict: BTreeMap::new(),
            switches_dict: BTreeMap::new(),
            text_dict: BTreeMap::new(),
            writable_dict: BTreeMap::new(),
            chosen_float_sensors: vec!["/120/1".into()],
            chosen_switches: Vec::new(),
            chosen_text_sensors: Vec::new(),
            chosen_writable_sensors: Vec::new(),
            force_legacy_mode: false,
            ignore_decimal_overrides: Vec::new(),
        };

        let data = config.to_data().unwrap();
        assert_eq!(data[keys::HOST], "192.168.0.25");

        let back = PersistedConfig::from_data(&data).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let mut data = ConfigData::new();
        data.insert(keys::HOST.into(), "boiler.local".into());

        assert!(matches!(
            PersistedConfig::from_data(&data),
            Err(ConfigError::Persisted(_))
        ));
    }
}
