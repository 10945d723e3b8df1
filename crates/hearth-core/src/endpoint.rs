// ── Endpoint records and the four discovery collections ──
//
// These types round-trip through the host platform's config-entry storage,
// so the serde layout (field names, untagged value/spec enums) is part of
// the persisted schema and must stay stable across releases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Writability metadata for a writable numeric endpoint.
///
/// Bounds are inclusive and already scaled to physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidValueSpec {
    pub scaled_min_value: f64,
    pub scaled_max_value: f64,
    /// Integer divisor linking the raw wire encoding to physical units.
    pub scale_factor: u32,
    /// Decimal digits implied by the scale factor; used to round input.
    pub dec_places: u32,
}

/// Binary-state metadata for a switch endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchValueSpec {
    pub on_value: i64,
    pub off_value: i64,
}

/// Valid-value metadata, present only for writable and switch endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSpec {
    Writable(ValidValueSpec),
    Switch(SwitchValueSpec),
}

/// Dialect-reported representation of an endpoint's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointType {
    Float,
    Text,
}

/// Last-read value of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointValue {
    Float(f64),
    Text(String),
}

/// One data point on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Hierarchical path; unique key within its collection.
    pub uri: String,
    /// Fully qualified resource path used for reads and writes.
    pub url: String,
    /// Human label assembled from the menu hierarchy.
    pub friendly_name: String,
    /// Raw unit string as reported by the device, possibly empty.
    pub unit: String,
    pub endpoint_type: EndpointType,
    pub value: EndpointValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<ValueSpec>,
}

impl EndpointRecord {
    /// The writable-range spec, if this is a writable numeric endpoint.
    pub fn writable_spec(&self) -> Option<&ValidValueSpec> {
        match &self.valid_values {
            Some(ValueSpec::Writable(spec)) => Some(spec),
            _ => None,
        }
    }

    /// The on/off codes, if this is a switch endpoint.
    pub fn switch_spec(&self) -> Option<SwitchValueSpec> {
        match &self.valid_values {
            Some(ValueSpec::Switch(spec)) => Some(*spec),
            _ => None,
        }
    }
}

/// The four output collections of one discovery pass, each mapping
/// `uri -> EndpointRecord`. A URI appears in at most one collection.
///
/// Passed in by the caller and mutated in place; the walker keeps no state
/// of its own afterwards, so distinct devices get distinct collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredEndpoints {
    pub float: BTreeMap<String, EndpointRecord>,
    pub switches: BTreeMap<String, EndpointRecord>,
    pub text: BTreeMap<String, EndpointRecord>,
    pub writable: BTreeMap<String, EndpointRecord>,
}

impl DiscoveredEndpoints {
    /// Whether any collection already holds this URI.
    pub fn contains_uri(&self, uri: &str) -> bool {
        self.float.contains_key(uri)
            || self.switches.contains_key(uri)
            || self.text.contains_key(uri)
            || self.writable.contains_key(uri)
    }

    /// Total number of endpoints across all four collections.
    pub fn len(&self) -> usize {
        self.float.len() + self.switches.len() + self.text.len() + self.writable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_writable() -> EndpointRecord {
        EndpointRecord {
            uri: "/120/10111/0/0/12129".into(),
            url: "/user/var//120/10111/0/0/12129".into(),
            friendly_name: "WW > Setpoint".into(),
            unit: "°C".into(),
            endpoint_type: EndpointType::Float,
            value: EndpointValue::Float(50.0),
            valid_values: Some(ValueSpec::Writable(ValidValueSpec {
                scaled_min_value: 20.3,
                scaled_max_value: 100.3,
                scale_factor: 10,
                dec_places: 0,
            })),
        }
    }

    #[test]
    fn serde_layout_round_trips() {
        let record = sample_writable();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["endpoint_type"], "FLOAT");
        assert_eq!(json["value"], 50.0);
        assert_eq!(json["valid_values"]["scaled_min_value"], 20.3);

        let back: EndpointRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn untagged_spec_distinguishes_switch_from_writable() {
        let json = serde_json::json!({
            "uri": "/1", "url": "/user/var//1", "friendly_name": "Pump",
            "unit": "", "endpoint_type": "TEXT", "value": "Ein",
            "valid_values": { "on_value": 1803, "off_value": 1802 }
        });
        let record: EndpointRecord = serde_json::from_value(json).unwrap();

        let spec = record.switch_spec().unwrap();
        assert_eq!(spec.on_value, 1803);
        assert_eq!(spec.off_value, 1802);
        assert!(record.writable_spec().is_none());
    }

    #[test]
    fn records_without_spec_omit_the_field() {
        let record = EndpointRecord {
            valid_values: None,
            ..sample_writable()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("valid_values").is_none());
    }

    #[test]
    fn contains_uri_checks_all_collections() {
        let mut discovered = DiscoveredEndpoints::default();
        assert!(discovered.is_empty());

        discovered
            .text
            .insert("/120/1".into(), sample_writable());
        assert!(discovered.contains_uri("/120/1"));
        assert!(!discovered.contains_uri("/120/2"));
        assert_eq!(discovered.len(), 1);
    }
}
