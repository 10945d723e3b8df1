// ── Dialect-specific endpoint discovery ──
//
// One flat pass over the fully expanded menu: flatten to leaves, skip
// duplicates before any network I/O, classify each leaf into exactly one
// of the four collections. A failure on a single leaf is logged and
// skipped; only a root-menu failure aborts the pass.
//
// The two dialects diverge because v1.1 never exposes a metadata resource:
// classification there leans on a hand-curated unit allow-list and two
// magic binary codes, while v1.2 has an explicit writability flag and
// declared bounds.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use hearth_api::model::{MenuLeaf, VarType};
use hearth_api::{ApiVersion, DeviceClient};

use crate::endpoint::{
    DiscoveredEndpoints, EndpointRecord, EndpointType, EndpointValue, SwitchValueSpec,
    ValidValueSpec, ValueSpec,
};
use crate::error::CoreError;
use crate::units;

/// Default scaled bounds for v1.1 writable endpoints, which carry no
/// device-declared range.
const V11_DEFAULT_SCALED_MIN: f64 = 0.0;
const V11_DEFAULT_SCALED_MAX: f64 = 100.0;

/// Which discovery strategy the device's API version calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ApiDialect {
    /// Legacy dialect: no metadata resource, unit-list classification.
    #[strum(serialize = "v1.1")]
    V11,
    /// Current dialect: per-endpoint metadata with declared bounds.
    #[strum(serialize = "v1.2")]
    V12,
}

impl ApiDialect {
    /// Select the dialect for a probed API version.
    pub fn for_version(version: ApiVersion) -> Self {
        if version.supports_metadata() {
            Self::V12
        } else {
            Self::V11
        }
    }
}

/// Walk the device menu and classify every leaf into `out`.
///
/// `out` is caller-owned and mutated in place. Duplicate URIs in the menu
/// are fetched at most once (first occurrence wins); a leaf whose fetch or
/// parse fails is skipped so the pass returns whatever it could collect.
pub async fn discover_into(
    client: &DeviceClient,
    dialect: ApiDialect,
    out: &mut DiscoveredEndpoints,
) -> Result<(), CoreError> {
    let menu = client
        .fetch_menu()
        .await
        .map_err(|e| CoreError::DiscoveryAborted {
            message: e.to_string(),
        })?;

    let mut seen: HashSet<String> = HashSet::new();
    let leaves = menu.leaves();
    debug!(dialect = %dialect, count = leaves.len(), "walking menu leaves");

    for leaf in leaves {
        if out.contains_uri(&leaf.uri) || !seen.insert(leaf.uri.clone()) {
            trace!(uri = %leaf.uri, "skipping duplicate menu entry");
            continue;
        }

        let result = match dialect {
            ApiDialect::V11 => classify_v11(client, &leaf, out).await,
            ApiDialect::V12 => classify_v12(client, &leaf, out).await,
        };
        if let Err(err) = result {
            warn!(uri = %leaf.uri, "skipping endpoint: {err}");
        }
    }
    Ok(())
}

/// Classify one leaf in the v1.2 dialect (metadata resource available).
async fn classify_v12(
    client: &DeviceClient,
    leaf: &MenuLeaf,
    out: &mut DiscoveredEndpoints,
) -> Result<(), hearth_api::Error> {
    // The menu routinely lists points the device then disowns; a reported
    // error means "skip this leaf", never "abort the pass".
    let Some(info) = client.fetch_metadata(&leaf.uri).await? else {
        return Ok(());
    };
    let reading = client.fetch_value(&leaf.uri).await?;

    // Time-of-day variables report an empty unit; tag them with the
    // synthetic marker so they render as text instead of a bare number.
    let unit = if info.var_type == VarType::TimeOfDay {
        units::MINUTES_SINCE_MIDNIGHT.to_owned()
    } else {
        info.unit.clone()
    };

    let endpoint_type = if info.var_type == VarType::Default && units::is_float_unit(&unit) {
        EndpointType::Float
    } else {
        EndpointType::Text
    };

    let record = |value, valid_values| EndpointRecord {
        uri: leaf.uri.clone(),
        url: DeviceClient::value_path(&leaf.uri),
        friendly_name: leaf.friendly_name.clone(),
        unit: unit.clone(),
        endpoint_type,
        value,
        valid_values,
    };

    if info.is_writable && !units::is_invisible_unit(&unit) {
        let scale_factor = info.scale_factor.max(1);
        let scale = f64::from(scale_factor);
        let spec = ValidValueSpec {
            scaled_min_value: info
                .raw_min
                .map_or(V11_DEFAULT_SCALED_MIN, |min| min as f64 / scale),
            scaled_max_value: info
                .raw_max
                .map_or(V11_DEFAULT_SCALED_MAX, |max| max as f64 / scale),
            scale_factor,
            dec_places: info.dec_places,
        };
        out.writable.insert(
            leaf.uri.clone(),
            record(
                EndpointValue::Float(reading.scaled()),
                Some(ValueSpec::Writable(spec)),
            ),
        );
    } else if unit.is_empty() && is_switch_code(reading.raw) {
        out.switches.insert(
            leaf.uri.clone(),
            record(
                EndpointValue::Text(reading.str_value.clone()),
                Some(ValueSpec::Switch(switch_codes())),
            ),
        );
    } else if !unit.is_empty() && endpoint_type == EndpointType::Float {
        out.float.insert(
            leaf.uri.clone(),
            record(EndpointValue::Float(reading.scaled()), None),
        );
    } else if !reading.str_value.is_empty() {
        out.text.insert(
            leaf.uri.clone(),
            record(EndpointValue::Text(reading.str_value.clone()), None),
        );
    } else {
        // An empty text endpoint carries no information.
        trace!(uri = %leaf.uri, "dropping empty endpoint");
    }
    Ok(())
}

/// Classify one leaf in the v1.1 dialect (value resource only).
async fn classify_v11(
    client: &DeviceClient,
    leaf: &MenuLeaf,
    out: &mut DiscoveredEndpoints,
) -> Result<(), hearth_api::Error> {
    let reading = client.fetch_value(&leaf.uri).await?;
    let unit = reading.unit.clone();

    let record = |endpoint_type, value, valid_values| EndpointRecord {
        uri: leaf.uri.clone(),
        url: DeviceClient::value_path(&leaf.uri),
        friendly_name: leaf.friendly_name.clone(),
        unit: unit.clone(),
        endpoint_type,
        value,
        valid_values,
    };

    if units::is_float_unit(&unit) {
        out.float.insert(
            leaf.uri.clone(),
            record(
                EndpointType::Float,
                EndpointValue::Float(reading.scaled()),
                None,
            ),
        );
    } else if units::is_writable_unit(&unit) {
        // No metadata resource in this dialect: fall back to conservative
        // built-in bounds with the scale the value reading reports.
        let spec = ValidValueSpec {
            scaled_min_value: V11_DEFAULT_SCALED_MIN,
            scaled_max_value: V11_DEFAULT_SCALED_MAX,
            scale_factor: reading.scale_factor.max(1),
            dec_places: reading.dec_places,
        };
        out.writable.insert(
            leaf.uri.clone(),
            record(
                EndpointType::Float,
                EndpointValue::Float(reading.scaled()),
                Some(ValueSpec::Writable(spec)),
            ),
        );
    } else if unit.is_empty() && is_switch_code(reading.raw) {
        out.switches.insert(
            leaf.uri.clone(),
            record(
                EndpointType::Text,
                EndpointValue::Text(reading.str_value.clone()),
                Some(ValueSpec::Switch(switch_codes())),
            ),
        );
    } else if unit.is_empty() && !reading.str_value.is_empty() {
        out.text.insert(
            leaf.uri.clone(),
            record(
                EndpointType::Text,
                EndpointValue::Text(reading.str_value.clone()),
                None,
            ),
        );
    } else {
        trace!(uri = %leaf.uri, "dropping unclassifiable endpoint");
    }
    Ok(())
}

fn is_switch_code(raw: i64) -> bool {
    raw == units::SWITCH_ON_VALUE || raw == units::SWITCH_OFF_VALUE
}

fn switch_codes() -> SwitchValueSpec {
    SwitchValueSpec {
        on_value: units::SWITCH_ON_VALUE,
        off_value: units::SWITCH_OFF_VALUE,
    }
}
