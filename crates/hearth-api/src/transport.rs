// Shared transport configuration for building reqwest::Client instances.
//
// The controller speaks plain HTTP on the local network, so there is no TLS
// knob here -- only the request timeout. Kept as its own type so callers can
// share one configured client across the discovery and write paths.

use std::time::Duration;

/// Transport configuration for the device HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("hearth/0.1.0")
            .build()?;
        Ok(client)
    }
}
