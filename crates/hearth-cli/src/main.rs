mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hearth_api::DeviceClient;
use hearth_config::ConnectionSettings;
use hearth_core::Adapter;

use crate::cli::{Cli, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let adapter = build_adapter(&cli.global)?;
    tracing::debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &adapter).await
}

/// Build an `Adapter` from the settings file, environment, and CLI flags
/// (flags win).
fn build_adapter(global: &GlobalOpts) -> Result<Adapter, CliError> {
    let mut settings = match ConnectionSettings::load(global.config.as_deref()) {
        Ok(settings) => settings,
        // Without a config file the host may still come from the flags; a
        // file the user explicitly pointed at must load cleanly.
        Err(hearth_config::ConfigError::Figment(_)) if global.config.is_none() => {
            if global.host.is_none() {
                return Err(CliError::NoHost);
            }
            ConnectionSettings {
                host: String::new(),
                port: 8080,
                timeout_secs: 15,
                force_legacy_mode: false,
                ignore_decimal_overrides: Vec::new(),
            }
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(ref host) = global.host {
        settings.host = host.clone();
    }
    if let Some(port) = global.port {
        settings.port = port;
    }
    if let Some(timeout) = global.timeout {
        settings.timeout_secs = timeout;
    }
    if global.legacy {
        settings.force_legacy_mode = true;
    }

    if settings.host.trim().is_empty() {
        return Err(CliError::NoHost);
    }

    let client = DeviceClient::new(&settings.host, settings.port, &settings.transport())
        .map_err(|e| CliError::Validation {
            field: "host".into(),
            reason: e.to_string(),
        })?;

    Ok(Adapter::new(client)
        .with_force_legacy(settings.force_legacy_mode)
        .with_ignore_decimal_overrides(settings.ignore_decimal_overrides.clone()))
}
