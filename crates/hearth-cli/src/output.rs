//! Table rendering for discovery results and fault listings.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use hearth_api::DeviceFault;
use hearth_core::{DiscoveredEndpoints, EndpointRecord, EndpointValue};

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Bucket")]
    bucket: &'static str,
    #[tabled(rename = "URI")]
    uri: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

fn row(bucket: &'static str, record: &EndpointRecord) -> EndpointRow {
    EndpointRow {
        bucket,
        uri: record.uri.clone(),
        name: record.friendly_name.clone(),
        value: match &record.value {
            EndpointValue::Float(v) => v.to_string(),
            EndpointValue::Text(s) => s.clone(),
        },
        unit: hearth_core::normalize_unit(&record.unit)
            .unwrap_or_default()
            .to_owned(),
    }
}

/// Render the four collections as one table, bucket by bucket.
pub fn print_endpoints(discovered: &DiscoveredEndpoints) {
    let rows: Vec<EndpointRow> = discovered
        .float
        .values()
        .map(|r| row("float", r))
        .chain(discovered.switches.values().map(|r| row("switch", r)))
        .chain(discovered.text.values().map(|r| row("text", r)))
        .chain(discovered.writable.values().map(|r| row("writable", r)))
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    println!(
        "{} float, {} switch, {} text, {} writable",
        discovered.float.len().green(),
        discovered.switches.len().green(),
        discovered.text.len().green(),
        discovered.writable.len().green(),
    );
}

#[derive(Tabled)]
struct FaultRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Message")]
    msg: String,
}

/// Render the device fault list, oldest first.
pub fn print_faults(faults: &[DeviceFault]) {
    if faults.is_empty() {
        println!("{}", "no active faults".green());
        return;
    }
    let rows: Vec<FaultRow> = faults
        .iter()
        .map(|f| FaultRow {
            time: f.time.format("%Y-%m-%d %H:%M").to_string(),
            priority: f.priority.clone(),
            source: f.source.clone(),
            msg: f.msg.clone(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::sharp()));
    println!("{} active fault(s)", faults.len().red());
}
