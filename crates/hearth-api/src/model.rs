// Typed records parsed from device responses.
//
// Parsing lives next to the types (`from_element` constructors) so the
// client module stays focused on transport mechanics. All numeric metadata
// keeps the device's raw integer encoding; scaling to physical units is the
// core crate's job.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::xml::Element;

// ── API version ──────────────────────────────────────────────────────

/// Device API version reported by the `/user/api` resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const V1_1: Self = Self { major: 1, minor: 1 };
    pub const V1_2: Self = Self { major: 1, minor: 2 };

    /// Whether this version exposes the per-endpoint metadata resource.
    pub fn supports_metadata(self) -> bool {
        self >= Self::V1_2
    }

    pub(crate) fn from_element(root: &Element) -> Result<Self, Error> {
        let api = root
            .find("api")
            .ok_or_else(|| Error::parse("response has no <api> element"))?;
        let version = api.require_attr("version")?;
        let (major, minor) = version
            .split_once('.')
            .ok_or_else(|| Error::parse(format!("malformed api version '{version}'")))?;
        Ok(Self {
            major: major
                .parse()
                .map_err(|_| Error::parse(format!("malformed api version '{version}'")))?,
            minor: minor
                .parse()
                .map_err(|_| Error::parse(format!("malformed api version '{version}'")))?,
        })
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// ── Menu tree ────────────────────────────────────────────────────────

/// The device's full data-point hierarchy, fetched once per discovery pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTree {
    /// Top-level function blocks (`<fub>` elements) in document order.
    pub nodes: Vec<MenuNode>,
}

/// One node of the menu hierarchy (a `<fub>` or `<object>` element).
#[derive(Debug, Clone, PartialEq)]
pub struct MenuNode {
    pub uri: String,
    pub name: String,
    pub children: Vec<MenuNode>,
}

/// A leaf data point flattened out of the menu, with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLeaf {
    pub uri: String,
    pub friendly_name: String,
}

impl MenuTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flatten the tree into its leaf data points, preserving document
    /// order. Labels join the node names along the path, e.g. "WW > Temp".
    pub fn leaves(&self) -> Vec<MenuLeaf> {
        let mut leaves = Vec::new();
        for node in &self.nodes {
            collect_leaves(node, &node.name, &mut leaves);
        }
        leaves
    }

    pub(crate) fn from_element(root: &Element) -> Result<Self, Error> {
        let menu = root
            .find("menu")
            .ok_or_else(|| Error::parse("response has no <menu> element"))?;
        let mut nodes = Vec::new();
        for fub in menu.children_named("fub") {
            nodes.push(MenuNode::from_element(fub)?);
        }
        Ok(Self { nodes })
    }
}

impl MenuNode {
    fn from_element(element: &Element) -> Result<Self, Error> {
        let uri = element.require_attr("uri")?.to_owned();
        let name = element.require_attr("name")?.to_owned();
        let mut children = Vec::new();
        for object in element.children_named("object") {
            children.push(Self::from_element(object)?);
        }
        Ok(Self {
            uri,
            name,
            children,
        })
    }
}

fn collect_leaves(node: &MenuNode, label: &str, out: &mut Vec<MenuLeaf>) {
    if node.children.is_empty() {
        out.push(MenuLeaf {
            uri: node.uri.trim().to_owned(),
            friendly_name: label.to_owned(),
        });
        return;
    }
    for child in &node.children {
        let label = format!("{label} > {}", child.name);
        collect_leaves(child, &label, out);
    }
}

// ── Variable metadata (dialect v1.2) ─────────────────────────────────

/// The declared representation of a variable (`<type>` in the metadata).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Default,
    /// Raw value counts minutes since midnight; rendered as text.
    TimeOfDay,
}

/// Per-endpoint metadata from the `varinfo` resource (dialect v1.2 only).
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub unit: String,
    pub dec_places: u32,
    pub scale_factor: u32,
    pub is_writable: bool,
    pub var_type: VarType,
    /// Declared raw (unscaled) bounds; present for writable variables.
    pub raw_min: Option<i64>,
    pub raw_max: Option<i64>,
}

impl VariableInfo {
    pub(crate) fn from_element(root: &Element) -> Result<Self, Error> {
        let variable = root
            .find("variable")
            .ok_or_else(|| Error::parse("response has no <variable> element"))?;

        let var_type = match variable.find("type").map(|t| t.text.trim()) {
            Some("TIME_OF_DAY") => VarType::TimeOfDay,
            _ => VarType::Default,
        };

        let bounds = variable.find("validValues");
        let raw_min = bounds
            .and_then(|b| b.find("min"))
            .map(|m| parse_number::<i64>(&m.text, "validValues/min"))
            .transpose()?;
        let raw_max = bounds
            .and_then(|b| b.find("max"))
            .map(|m| parse_number::<i64>(&m.text, "validValues/max"))
            .transpose()?;

        Ok(Self {
            unit: variable.attr("unit").unwrap_or_default().to_owned(),
            dec_places: parse_number(variable.require_attr("decPlaces")?, "decPlaces")?,
            scale_factor: parse_number(variable.require_attr("scaleFactor")?, "scaleFactor")?,
            is_writable: variable.require_attr("isWritable")? == "1",
            var_type,
            raw_min,
            raw_max,
        })
    }
}

// ── Value reading ────────────────────────────────────────────────────

/// One reading of a data point: the raw integer encoding plus the
/// formatting metadata the device reports alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueReading {
    /// Raw integer wire encoding.
    pub raw: i64,
    /// Pre-formatted display string, possibly empty.
    pub str_value: String,
    pub unit: String,
    pub dec_places: u32,
    pub scale_factor: u32,
}

impl ValueReading {
    /// The physical value: raw encoding divided by the scale factor.
    pub fn scaled(&self) -> f64 {
        if self.scale_factor == 0 {
            self.raw as f64
        } else {
            self.raw as f64 / f64::from(self.scale_factor)
        }
    }

    pub(crate) fn from_element(root: &Element) -> Result<Self, Error> {
        let value = root
            .find("value")
            .ok_or_else(|| Error::parse("response has no <value> element"))?;
        Ok(Self {
            raw: parse_number(value.text.trim(), "value")?,
            str_value: value.attr("strValue").unwrap_or_default().to_owned(),
            unit: value.attr("unit").unwrap_or_default().to_owned(),
            dec_places: parse_number(value.require_attr("decPlaces")?, "decPlaces")?,
            scale_factor: parse_number(value.require_attr("scaleFactor")?, "scaleFactor")?,
        })
    }
}

// ── Fault listing ────────────────────────────────────────────────────

/// One active fault from the device's error log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFault {
    /// Short fault message (the `msg` attribute).
    pub msg: String,
    pub priority: String,
    pub time: NaiveDateTime,
    /// Longer description (element text), possibly empty.
    pub text: String,
    /// Name of the function block that raised the fault.
    pub source: String,
}

/// Parse the `/user/errors` listing, sorted oldest-first by timestamp.
pub(crate) fn faults_from_element(root: &Element) -> Result<Vec<DeviceFault>, Error> {
    let errors = root
        .find("errors")
        .ok_or_else(|| Error::parse("response has no <errors> element"))?;

    let mut faults = Vec::new();
    for fub in errors.children_named("fub") {
        let source = fub.attr("name").unwrap_or_default().to_owned();
        for error in fub.children_named("error") {
            let time_str = error.require_attr("time")?;
            let time = NaiveDateTime::parse_from_str(time_str, "%Y-%m-%d %H:%M")
                .map_err(|e| Error::parse(format!("bad fault time '{time_str}': {e}")))?;
            faults.push(DeviceFault {
                msg: error.attr("msg").unwrap_or_default().to_owned(),
                priority: error.attr("priority").unwrap_or_default().to_owned(),
                time,
                text: error.text.trim().to_owned(),
                source: source.clone(),
            });
        }
    }
    faults.sort_by(|a, b| a.time.cmp(&b.time));
    Ok(faults)
}

// ── Helpers ──────────────────────────────────────────────────────────

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::parse(format!("malformed {what} '{raw}'")))
}
