use thiserror::Error;

/// Top-level error type for the `hearth-api` crate.
///
/// Covers every failure mode of the device client: transport, XML parsing,
/// and device-reported per-endpoint errors. `hearth-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// Malformed XML or a response missing an expected element/attribute.
    #[error("XML parse error: {message}")]
    Parse { message: String },

    // ── Device ──────────────────────────────────────────────────────
    /// The device's own XML reported an `<error>` element for a resource.
    #[error("Device error for {uri}: {message}")]
    Device { uri: String, message: String },

    /// A time-program slot index outside the valid range of 0..=96.
    #[error("Invalid schedule slot index {value} (must be 0..=96)")]
    InvalidSlot { value: u8 },
}

impl Error {
    /// Shorthand for a parse failure with a formatted message.
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Returns `true` if the device itself reported this error, meaning the
    /// endpoint should be skipped rather than the whole pass aborted.
    pub fn is_device_reported(&self) -> bool {
        matches!(self, Self::Device { .. })
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
