//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "hearth", version, about = "Diagnostics for XML-REST heating controllers")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device hostname or IP address.
    #[arg(long, global = true, env = "HEARTH_HOST")]
    pub host: Option<String>,

    /// Device HTTP port.
    #[arg(long, global = true, env = "HEARTH_PORT")]
    pub port: Option<u16>,

    /// Path to a hearth.toml settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Force the legacy v1.1 discovery strategy.
    #[arg(long, global = true)]
    pub legacy: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the device's API version and discovery dialect.
    Probe,

    /// Walk the device menu and classify every data point.
    Discover {
        /// Emit the four collections as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Read one data point's current value.
    Read {
        /// Hierarchical endpoint URI, e.g. /120/10111/0/0/12271.
        uri: String,
    },

    /// Write a physical value to a writable data point.
    Write {
        /// Hierarchical endpoint URI.
        uri: String,

        /// Physical value (scaled units, e.g. 50.5 for 50.5 °C).
        value: f64,

        /// Skip the declared decimal-places rounding for this write.
        #[arg(long)]
        force_decimals: bool,

        /// Send the value raw, without discovery-based scaling.
        #[arg(long)]
        raw: bool,

        /// Time-program slot the write starts at (0..=96, raw mode only).
        #[arg(long, requires = "raw")]
        begin: Option<u8>,

        /// Time-program slot the write ends at (0..=96, raw mode only).
        #[arg(long, requires = "raw")]
        end: Option<u8>,
    },

    /// List the device's active faults.
    Faults {
        /// Emit faults as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}
