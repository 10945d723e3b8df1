//! Command handlers.

use hearth_core::Adapter;

use crate::cli::Command;
use crate::error::CliError;
use crate::output;

pub async fn dispatch(command: Command, adapter: &Adapter) -> Result<(), CliError> {
    match command {
        Command::Probe => probe(adapter).await,
        Command::Discover { json } => discover(adapter, json).await,
        Command::Read { uri } => read(adapter, &uri).await,
        Command::Write {
            uri,
            value,
            force_decimals,
            raw,
            begin,
            end,
        } => write(adapter, &uri, value, force_decimals, raw, begin, end).await,
        Command::Faults { json } => faults(adapter, json).await,
    }
}

async fn probe(adapter: &Adapter) -> Result<(), CliError> {
    let dialect = adapter.probe_dialect().await?;
    println!("discovery dialect: {dialect}");
    Ok(())
}

async fn discover(adapter: &Adapter, json: bool) -> Result<(), CliError> {
    let dialect = adapter.probe_dialect().await?;
    let discovered = adapter.discover(dialect).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&discovered)?);
    } else {
        output::print_endpoints(&discovered);
    }
    Ok(())
}

async fn read(adapter: &Adapter, uri: &str) -> Result<(), CliError> {
    let reading = adapter.read(uri).await?;
    match hearth_core::normalize_unit(&reading.unit) {
        Some(unit) => println!("{} {unit}", reading.scaled()),
        None if reading.str_value.is_empty() => println!("{}", reading.scaled()),
        None => println!("{}", reading.str_value),
    }
    Ok(())
}

async fn write(
    adapter: &Adapter,
    uri: &str,
    value: f64,
    force_decimals: bool,
    raw: bool,
    begin: Option<u8>,
    end: Option<u8>,
) -> Result<(), CliError> {
    if raw {
        adapter.write_raw(uri, value, begin, end).await?;
    } else {
        // Scaling needs the endpoint's declared decimals and scale factor,
        // so run a discovery pass and look the endpoint up.
        let dialect = adapter.probe_dialect().await?;
        let discovered = adapter.discover(dialect).await?;
        let record = discovered
            .writable
            .get(uri)
            .ok_or_else(|| CliError::NotWritable { uri: uri.to_owned() })?;
        adapter.write_scaled(record, value, force_decimals).await?;
    }
    eprintln!("value written");
    Ok(())
}

async fn faults(adapter: &Adapter, json: bool) -> Result<(), CliError> {
    let faults = adapter.faults().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&faults)?);
    } else {
        output::print_faults(&faults);
    }
    Ok(())
}
