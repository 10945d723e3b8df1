//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hearth_config::ConfigError;
use hearth_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the device")]
    #[diagnostic(
        code(hearth::connection_failed),
        help(
            "Check that the device is powered and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Device request timed out")]
    #[diagnostic(
        code(hearth::timeout),
        help("Increase the timeout with --timeout or check the device's responsiveness.")
    )]
    Timeout,

    // ── Configuration ────────────────────────────────────────────────
    #[error("No device host configured")]
    #[diagnostic(
        code(hearth::no_host),
        help(
            "Pass --host, set HEARTH_HOST, or point --config at a hearth.toml\n\
             with a `host = \"...\"` entry."
        )
    )]
    NoHost,

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hearth::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(hearth::config))]
    Config(ConfigError),

    // ── Endpoints ────────────────────────────────────────────────────
    #[error("Endpoint '{uri}' was not discovered as writable")]
    #[diagnostic(
        code(hearth::not_writable),
        help("Run: hearth discover to see the writable endpoints, or use --raw.")
    )]
    NotWritable { uri: String },

    #[error("Device rejected the write to {uri}")]
    #[diagnostic(
        code(hearth::write_rejected),
        help("The value was not applied. Check the endpoint's valid range on the device.")
    )]
    WriteRejected { uri: String },

    // ── Device / API ─────────────────────────────────────────────────
    #[error("Device error: {message}")]
    #[diagnostic(code(hearth::device_error))]
    Device { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(hearth::api_error))]
    Api { message: String },

    // ── IO / serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NoHost | Self::Validation { .. } => exit_code::USAGE,
            Self::NotWritable { .. } => exit_code::NOT_FOUND,
            Self::WriteRejected { .. } => exit_code::REJECTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::DiscoveryAborted { message } => CliError::Api {
                message: format!("discovery aborted: {message}"),
            },
            CoreError::WriteRejected { uri } => CliError::WriteRejected { uri },
            CoreError::NotWritable { uri } | CoreError::NotASwitch { uri } => {
                CliError::NotWritable { uri }
            }
            CoreError::Device { uri, message } => CliError::Device {
                message: format!("{uri}: {message}"),
            },
            CoreError::Api { message } => CliError::Api { message },
            CoreError::InvalidArgument { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
