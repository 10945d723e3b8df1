// ── Versioned configuration migrations ──
//
// A strictly ordered chain of pairwise steps, each converting schema
// version N to N+1. The runner applies steps until the entry reaches the
// current version; the host then performs exactly one write-back.
// Migrations fail closed: a field a step expects but cannot find aborts
// the migration so a half-transformed entry is never persisted.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use hearth_core::units::MINUTES_SINCE_MIDNIGHT;

use crate::schema::keys;

/// Loose persisted map, as handed over by the host platform's storage.
pub type ConfigData = serde_json::Map<String, Value>;

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    /// The entry was written by a newer build; migrations never downgrade.
    #[error("config entry has schema version {found}, newer than supported version {current}")]
    FutureVersion { found: u32, current: u32 },

    #[error("config entry has unknown schema version {found}")]
    UnknownVersion { found: u32 },

    #[error("missing field '{field}' while migrating v{from} to v{to}")]
    MissingField {
        field: &'static str,
        from: u32,
        to: u32,
    },

    #[error("field '{field}' has the wrong shape while migrating v{from} to v{to}")]
    InvalidField {
        field: &'static str,
        from: u32,
        to: u32,
    },
}

/// Result of running the migration chain on one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationOutcome {
    /// Entry already matches the current schema; nothing to persist.
    Current,
    /// Entry was transformed; the host must persist data, options and the
    /// new version together.
    Migrated {
        data: ConfigData,
        options: ConfigData,
        version: u32,
    },
}

/// Migrate one persisted entry forward to [`SCHEMA_VERSION`].
///
/// Idempotent on current-version input. Versions above the current one
/// fail: downgrading would have to invent information that is not there.
pub fn migrate_entry(
    version: u32,
    data: ConfigData,
    options: ConfigData,
) -> Result<MigrationOutcome, MigrationError> {
    if version == SCHEMA_VERSION {
        debug!(version, "config entry is current; no migration needed");
        return Ok(MigrationOutcome::Current);
    }
    if version > SCHEMA_VERSION {
        return Err(MigrationError::FutureVersion {
            found: version,
            current: SCHEMA_VERSION,
        });
    }
    if version == 0 {
        return Err(MigrationError::UnknownVersion { found: version });
    }

    let mut current = version;
    let mut data = data;
    let mut options = options;
    while current < SCHEMA_VERSION {
        (data, options) = match current {
            1 => migrate_v1_to_v2(data, options)?,
            2 => migrate_v2_to_v3(data, options)?,
            3 => migrate_v3_to_v4(data, options)?,
            4 => migrate_v4_to_v5(data, options)?,
            5 => migrate_v5_to_v6(data, options)?,
            other => return Err(MigrationError::UnknownVersion { found: other }),
        };
        current += 1;
        debug!(version = current, "applied migration step");
    }

    info!(from = version, to = current, "migrated config entry");
    Ok(MigrationOutcome::Migrated {
        data,
        options,
        version: current,
    })
}

// ── Step implementations ─────────────────────────────────────────────

type StepResult = Result<(ConfigData, ConfigData), MigrationError>;

/// v2 introduced the switch collection and selection list.
fn migrate_v1_to_v2(mut data: ConfigData, options: ConfigData) -> StepResult {
    require_object(&data, keys::FLOAT_DICT, 1, 2)?;
    require_array(&data, keys::CHOSEN_FLOAT_SENSORS, 1, 2)?;

    data.insert(keys::SWITCHES_DICT.into(), Value::Object(ConfigData::new()));
    data.insert(keys::CHOSEN_SWITCHES.into(), Value::Array(Vec::new()));
    Ok((data, options))
}

/// v3 introduced writable endpoints.
fn migrate_v2_to_v3(mut data: ConfigData, options: ConfigData) -> StepResult {
    require_object(&data, keys::SWITCHES_DICT, 2, 3)?;

    data.insert(keys::WRITABLE_DICT.into(), Value::Object(ConfigData::new()));
    data.insert(
        keys::CHOSEN_WRITABLE_SENSORS.into(),
        Value::Array(Vec::new()),
    );
    Ok((data, options))
}

/// v4 introduced text endpoints.
fn migrate_v3_to_v4(mut data: ConfigData, options: ConfigData) -> StepResult {
    require_object(&data, keys::WRITABLE_DICT, 3, 4)?;

    data.insert(keys::TEXT_DICT.into(), Value::Object(ConfigData::new()));
    data.insert(keys::CHOSEN_TEXT_SENSORS.into(), Value::Array(Vec::new()));
    Ok((data, options))
}

/// v5 introduced the legacy-mode flag and the decimal-override list.
fn migrate_v4_to_v5(mut data: ConfigData, options: ConfigData) -> StepResult {
    require_object(&data, keys::TEXT_DICT, 4, 5)?;

    data.insert(keys::FORCE_LEGACY_MODE.into(), Value::Bool(false));
    data.insert(
        keys::IGNORE_DECIMAL_OVERRIDES.into(),
        Value::Array(Vec::new()),
    );
    Ok((data, options))
}

/// v6 reclassified time-of-day endpoints: any float-dict entry carrying
/// the minutes-since-midnight marker moves to the text dict, and its URI
/// moves from the chosen-float list to the chosen-text list. Options are
/// merged into data first and come back empty.
fn migrate_v5_to_v6(mut data: ConfigData, options: ConfigData) -> StepResult {
    for (key, value) in options {
        data.insert(key, value);
    }

    let mut float_dict = take_object(&mut data, keys::FLOAT_DICT, 5, 6)?;
    let mut text_dict = take_object(&mut data, keys::TEXT_DICT, 5, 6)?;
    let mut chosen_float = take_string_array(&mut data, keys::CHOSEN_FLOAT_SENSORS, 5, 6)?;
    let mut chosen_text = take_string_array(&mut data, keys::CHOSEN_TEXT_SENSORS, 5, 6)?;

    let moved: Vec<String> = float_dict
        .iter()
        .filter(|(_, entry)| {
            entry.get("unit").and_then(Value::as_str) == Some(MINUTES_SINCE_MIDNIGHT)
        })
        .map(|(uri, _)| uri.clone())
        .collect();

    for uri in &moved {
        if let Some(entry) = float_dict.remove(uri) {
            text_dict.insert(uri.clone(), entry);
        }
        if let Some(pos) = chosen_float.iter().position(|chosen| chosen == uri) {
            chosen_float.remove(pos);
            chosen_text.push(uri.clone());
        }
    }
    if !moved.is_empty() {
        info!(count = moved.len(), "moved time-of-day endpoints to the text collection");
    }

    data.insert(keys::FLOAT_DICT.into(), Value::Object(float_dict));
    data.insert(keys::TEXT_DICT.into(), Value::Object(text_dict));
    data.insert(
        keys::CHOSEN_FLOAT_SENSORS.into(),
        Value::Array(chosen_float.into_iter().map(Value::String).collect()),
    );
    data.insert(
        keys::CHOSEN_TEXT_SENSORS.into(),
        Value::Array(chosen_text.into_iter().map(Value::String).collect()),
    );
    Ok((data, ConfigData::new()))
}

// ── Fail-closed field access ─────────────────────────────────────────

fn require_object(
    data: &ConfigData,
    field: &'static str,
    from: u32,
    to: u32,
) -> Result<(), MigrationError> {
    match data.get(field) {
        Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(MigrationError::InvalidField { field, from, to }),
        None => Err(MigrationError::MissingField { field, from, to }),
    }
}

fn require_array(
    data: &ConfigData,
    field: &'static str,
    from: u32,
    to: u32,
) -> Result<(), MigrationError> {
    match data.get(field) {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(MigrationError::InvalidField { field, from, to }),
        None => Err(MigrationError::MissingField { field, from, to }),
    }
}

fn take_object(
    data: &mut ConfigData,
    field: &'static str,
    from: u32,
    to: u32,
) -> Result<ConfigData, MigrationError> {
    match data.remove(field) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(MigrationError::InvalidField { field, from, to }),
        None => Err(MigrationError::MissingField { field, from, to }),
    }
}

fn take_string_array(
    data: &mut ConfigData,
    field: &'static str,
    from: u32,
    to: u32,
) -> Result<Vec<String>, MigrationError> {
    match data.remove(field) {
        Some(Value::Array(values)) => values
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Ok(s),
                _ => Err(MigrationError::InvalidField { field, from, to }),
            })
            .collect(),
        Some(_) => Err(MigrationError::InvalidField { field, from, to }),
        None => Err(MigrationError::MissingField { field, from, to }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(unit: &str) -> Value {
        json!({
            "uri": "/120/1", "url": "/user/var//120/1", "friendly_name": "X",
            "unit": unit, "endpoint_type": "FLOAT", "value": 1.0
        })
    }

    fn v5_data() -> ConfigData {
        let data = json!({
            "host": "192.168.0.25",
            "port": 8080,
            "float_dict": {
                "/120/1": record("°C"),
                "/120/2": record(MINUTES_SINCE_MIDNIGHT),
            },
            "switches_dict": {},
            "text_dict": { "/120/3": record("") },
            "writable_dict": {},
            "chosen_float_sensors": ["/120/1", "/120/2"],
            "chosen_switches": [],
            "chosen_text_sensors": ["/120/3"],
            "chosen_writable_sensors": [],
            "force_legacy_mode": false,
            "ignore_decimal_overrides": [],
        });
        match data {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn current_version_is_a_no_op() {
        let outcome = migrate_entry(SCHEMA_VERSION, v5_data(), ConfigData::new()).unwrap();
        assert_eq!(outcome, MigrationOutcome::Current);
    }

    #[test]
    fn future_version_fails_closed() {
        let result = migrate_entry(SCHEMA_VERSION + 1, ConfigData::new(), ConfigData::new());
        assert_eq!(
            result,
            Err(MigrationError::FutureVersion {
                found: SCHEMA_VERSION + 1,
                current: SCHEMA_VERSION
            })
        );
    }

    #[test]
    fn v5_to_v6_moves_marker_entries_to_text() {
        let MigrationOutcome::Migrated {
            data,
            options,
            version,
        } = migrate_entry(5, v5_data(), ConfigData::new()).unwrap()
        else {
            panic!("expected a migration");
        };

        assert_eq!(version, 6);
        assert!(options.is_empty());

        let float_dict = data[keys::FLOAT_DICT].as_object().unwrap();
        let text_dict = data[keys::TEXT_DICT].as_object().unwrap();

        // Marker entry left the float dict and landed in text, exactly once.
        assert!(!float_dict.contains_key("/120/2"));
        assert_eq!(
            text_dict["/120/2"]["unit"],
            Value::String(MINUTES_SINCE_MIDNIGHT.into())
        );
        // Untouched entries stayed where they were.
        assert!(float_dict.contains_key("/120/1"));
        assert!(text_dict.contains_key("/120/3"));

        // Selection lists follow the entries.
        assert_eq!(data[keys::CHOSEN_FLOAT_SENSORS], json!(["/120/1"]));
        assert_eq!(data[keys::CHOSEN_TEXT_SENSORS], json!(["/120/3", "/120/2"]));

        // Unrelated fields copied unchanged.
        assert_eq!(data[keys::HOST], "192.168.0.25");
        assert_eq!(data[keys::FORCE_LEGACY_MODE], Value::Bool(false));
    }

    #[test]
    fn v5_to_v6_is_idempotent_on_its_own_output() {
        let (once, _) = migrate_v5_to_v6(v5_data(), ConfigData::new()).unwrap();
        let (twice, _) = migrate_v5_to_v6(once.clone(), ConfigData::new()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn v5_to_v6_merges_options_into_data() {
        let mut options = ConfigData::new();
        options.insert(
            keys::CHOSEN_FLOAT_SENSORS.into(),
            json!(["/120/2"]), // options flow narrowed the selection
        );

        let MigrationOutcome::Migrated { data, options, .. } =
            migrate_entry(5, v5_data(), options).unwrap()
        else {
            panic!("expected a migration");
        };

        assert!(options.is_empty());
        // The merged (narrower) selection was the one migrated.
        assert_eq!(data[keys::CHOSEN_FLOAT_SENSORS], json!([]));
        assert_eq!(data[keys::CHOSEN_TEXT_SENSORS], json!(["/120/3", "/120/2"]));
    }

    #[test]
    fn v5_to_v6_fails_closed_on_missing_float_dict() {
        let mut data = v5_data();
        data.remove(keys::FLOAT_DICT);

        let result = migrate_entry(5, data, ConfigData::new());
        assert_eq!(
            result,
            Err(MigrationError::MissingField {
                field: keys::FLOAT_DICT,
                from: 5,
                to: 6
            })
        );
    }

    #[test]
    fn v5_to_v6_fails_closed_on_wrong_shape() {
        let mut data = v5_data();
        data.insert(keys::CHOSEN_FLOAT_SENSORS.into(), json!("not-a-list"));

        let result = migrate_entry(5, data, ConfigData::new());
        assert_eq!(
            result,
            Err(MigrationError::InvalidField {
                field: keys::CHOSEN_FLOAT_SENSORS,
                from: 5,
                to: 6
            })
        );
    }

    #[test]
    fn chain_runs_all_steps_from_v1() {
        let v1 = match json!({
            "host": "boiler.local",
            "port": 8080,
            "float_dict": { "/120/1": record("°C") },
            "chosen_float_sensors": ["/120/1"],
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let MigrationOutcome::Migrated { data, version, .. } =
            migrate_entry(1, v1, ConfigData::new()).unwrap()
        else {
            panic!("expected a migration");
        };

        assert_eq!(version, SCHEMA_VERSION);
        // Every step's additions are present with their defaults.
        assert_eq!(data[keys::SWITCHES_DICT], json!({}));
        assert_eq!(data[keys::CHOSEN_SWITCHES], json!([]));
        assert_eq!(data[keys::WRITABLE_DICT], json!({}));
        assert_eq!(data[keys::CHOSEN_WRITABLE_SENSORS], json!([]));
        assert_eq!(data[keys::TEXT_DICT], json!({}));
        assert_eq!(data[keys::CHOSEN_TEXT_SENSORS], json!([]));
        assert_eq!(data[keys::FORCE_LEGACY_MODE], Value::Bool(false));
        assert_eq!(data[keys::IGNORE_DECIMAL_OVERRIDES], json!([]));
        // And the original fields survived.
        assert_eq!(data[keys::HOST], "boiler.local");
        assert!(data[keys::FLOAT_DICT].as_object().unwrap().contains_key("/120/1"));
    }

    #[test]
    fn v1_missing_float_dict_fails_closed() {
        let v1 = match json!({ "host": "boiler.local", "chosen_float_sensors": [] }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let result = migrate_entry(1, v1, ConfigData::new());
        assert_eq!(
            result,
            Err(MigrationError::MissingField {
                field: keys::FLOAT_DICT,
                from: 1,
                to: 2
            })
        );
    }
}
