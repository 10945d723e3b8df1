// ── Core error types ──
//
// User-facing errors from hearth-core. Consumers never see reqwest or XML
// failures directly; the `From<hearth_api::Error>` impl translates the
// transport layer into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Device request timed out")]
    Timeout,

    // ── Discovery errors ─────────────────────────────────────────────
    /// The root menu could not be fetched; without it there is nothing
    /// to walk, so the whole pass aborts.
    #[error("Discovery aborted: {message}")]
    DiscoveryAborted { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// The device answered the write but refused to apply it. The user's
    /// intent was not applied and must be surfaced, not dropped.
    #[error("Device rejected write to {uri}")]
    WriteRejected { uri: String },

    #[error("Endpoint {uri} is not writable")]
    NotWritable { uri: String },

    #[error("Endpoint {uri} is not a switch")]
    NotASwitch { uri: String },

    // ── Device / API errors (wrapped, not exposed raw) ───────────────
    #[error("Device error for {uri}: {message}")]
    Device { uri: String, message: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hearth_api::Error> for CoreError {
    fn from(err: hearth_api::Error) -> Self {
        match err {
            hearth_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                    }
                }
            }
            hearth_api::Error::InvalidUrl(e) => CoreError::InvalidArgument {
                message: format!("invalid URL: {e}"),
            },
            hearth_api::Error::Parse { message } => CoreError::Api { message },
            hearth_api::Error::Device { uri, message } => CoreError::Device { uri, message },
            hearth_api::Error::InvalidSlot { value } => CoreError::InvalidArgument {
                message: format!("schedule slot {value} out of range 0..=96"),
            },
        }
    }
}
