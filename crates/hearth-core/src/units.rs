// ── Unit and scale resolution ──
//
// Pure lookups and arithmetic linking the device's raw integer wire
// encoding to physical values. The allow-lists below are fixed properties
// of the device firmware, not configuration.

use strum::Display;

/// Synthetic unit marking time-of-day endpoints (raw value counts minutes
/// since midnight). Such points are rendered as text, never as numbers.
pub const MINUTES_SINCE_MIDNIGHT: &str = "minutes since midnight";

/// Units excluded from the writable classification even when the device
/// flags the endpoint writable.
pub const INVISIBLE_UNITS: &[&str] = &[MINUTES_SINCE_MIDNIGHT];

/// Raw code the device uses for a switch in the "on" state.
pub const SWITCH_ON_VALUE: i64 = 1803;
/// Raw code the device uses for a switch in the "off" state.
pub const SWITCH_OFF_VALUE: i64 = 1802;

/// Units that identify a numeric measurement in the v1.1 dialect, which
/// has no metadata resource to consult.
pub const FLOAT_UNITS: &[&str] = &[
    "%", "A", "Hz", "Ohm", "Pa", "U/min", "V", "W", "W/m²", "bar", "kW", "kWh", "kg", "mV", "m²",
    "s", "°C", "%rH",
];

/// Units that identify a writable setting in the v1.1 dialect. Disjoint
/// from the float allow-list: by unit alone a temperature setpoint cannot
/// be told apart from a temperature sensor, so shared units classify as
/// read-only floats and only setting-style duration units land here.
pub const WRITABLE_UNITS: &[&str] = &["min", "h"];

pub(crate) fn is_float_unit(unit: &str) -> bool {
    FLOAT_UNITS.contains(&unit)
}

pub(crate) fn is_writable_unit(unit: &str) -> bool {
    WRITABLE_UNITS.contains(&unit)
}

pub(crate) fn is_invisible_unit(unit: &str) -> bool {
    INVISIBLE_UNITS.contains(&unit)
}

/// Normalize a device-reported unit for display.
///
/// The device renders relative humidity as `%rH`; downstream consumers
/// expect a plain percent sign. An empty unit means "no unit".
pub fn normalize_unit(raw: &str) -> Option<&str> {
    match raw {
        "" => None,
        "%rH" => Some("%"),
        other => Some(other),
    }
}

/// Physical quantity categories derivable from a device unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PhysicalQuantity {
    Temperature,
    Power,
    Current,
    Frequency,
    Pressure,
    Voltage,
    Irradiance,
    Energy,
    Mass,
    Duration,
    Humidity,
}

/// Map a device-reported unit to its physical quantity, if known.
///
/// Unknown units map to `None`: a generic number with no category.
pub fn quantity_for_unit(unit: &str) -> Option<PhysicalQuantity> {
    use PhysicalQuantity as Q;
    match unit {
        "°C" => Some(Q::Temperature),
        "W" | "kW" => Some(Q::Power),
        "A" => Some(Q::Current),
        "Hz" => Some(Q::Frequency),
        "Pa" | "bar" => Some(Q::Pressure),
        "V" | "mV" => Some(Q::Voltage),
        "W/m²" => Some(Q::Irradiance),
        "kWh" => Some(Q::Energy),
        "kg" => Some(Q::Mass),
        "s" => Some(Q::Duration),
        "%rH" => Some(Q::Humidity),
        _ => None,
    }
}

/// Step size for user input on a writable endpoint.
///
/// With the decimal override set, the step exposes as many decimal places
/// as the scale factor allows (an explicit per-endpoint opt-in; the device
/// may round the extra precision away). Otherwise the declared decimal
/// place count wins.
pub fn step_size(dec_places: u32, scale_factor: u32, ignore_decimal_override: bool) -> f64 {
    if ignore_decimal_override {
        let digits = scale_factor.max(1).to_string().len() as i32;
        10f64.powi(-(digits - 1))
    } else {
        10f64.powi(-(dec_places as i32))
    }
}

/// Scale a physical value to the device's raw integer encoding for a write.
///
/// Without overrides the value is first rounded to the declared decimal
/// places, then scaled; with either override the declared decimals are
/// ignored and only the scale factor applies. Both paths round to the
/// nearest integer last -- the wire format is integer-encoded.
pub fn scale_for_write(
    value: f64,
    dec_places: u32,
    scale_factor: u32,
    ignore_decimal_override: bool,
    force_decimals: bool,
) -> i64 {
    let scaled = if ignore_decimal_override || force_decimals {
        value * f64::from(scale_factor)
    } else {
        round_to_places(value, dec_places) * f64::from(scale_factor)
    };
    scaled.round() as i64
}

fn round_to_places(value: f64, dec_places: u32) -> f64 {
    let factor = 10f64.powi(dec_places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rewrites_humidity_and_drops_empty() {
        assert_eq!(normalize_unit("%rH"), Some("%"));
        assert_eq!(normalize_unit(""), None);
        assert_eq!(normalize_unit("°C"), Some("°C"));
    }

    #[test]
    fn quantities_follow_the_fixed_table() {
        assert_eq!(
            quantity_for_unit("°C"),
            Some(PhysicalQuantity::Temperature)
        );
        assert_eq!(quantity_for_unit("bar"), Some(PhysicalQuantity::Pressure));
        assert_eq!(quantity_for_unit("kWh"), Some(PhysicalQuantity::Energy));
        assert_eq!(quantity_for_unit("%rH"), Some(PhysicalQuantity::Humidity));
        assert_eq!(quantity_for_unit("furlongs"), None);
    }

    #[test]
    fn step_size_uses_declared_decimals_by_default() {
        assert_eq!(step_size(0, 10, false), 1.0);
        assert_eq!(step_size(1, 10, false), 0.1);
        assert_eq!(step_size(2, 100, false), 0.01);
    }

    #[test]
    fn step_size_override_follows_scale_factor_digits() {
        // scale factor 10 has two digits -> step 0.1
        assert_eq!(step_size(0, 10, true), 0.1);
        // scale factor 100 has three digits -> step 0.01
        assert_eq!(step_size(0, 100, true), 0.01);
        assert_eq!(step_size(0, 1, true), 1.0);
    }

    #[test]
    fn write_scaling_rounds_to_declared_decimals_first() {
        // round(round(50.46, 1) * 10) = round(50.5 * 10) = 505
        assert_eq!(scale_for_write(50.46, 1, 10, false, false), 505);
        // round(round(50.44, 0) * 10) = round(50.0 * 10) = 500
        assert_eq!(scale_for_write(50.44, 0, 10, false, false), 500);
    }

    #[test]
    fn write_scaling_override_keeps_full_precision() {
        // round(50.46 * 10) = 505 despite decPlaces=0
        assert_eq!(scale_for_write(50.46, 0, 10, true, false), 505);
        assert_eq!(scale_for_write(50.46, 0, 10, false, true), 505);
    }

    #[test]
    fn write_scaling_handles_negative_values() {
        assert_eq!(scale_for_write(-3.5, 0, 10, false, false), -40);
        assert_eq!(scale_for_write(-3.5, 1, 10, false, false), -35);
    }
}
