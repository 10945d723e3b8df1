// Connection settings for one device.
//
// Loaded from an optional TOML file merged with `HEARTH_`-prefixed
// environment variables; env wins. Only `host` is mandatory.

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

use hearth_api::TransportConfig;

use crate::ConfigError;

/// How to reach and talk to a device.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Device hostname or IP address.
    pub host: String,

    /// Device HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Force the v1.1 discovery strategy even on newer firmware.
    #[serde(default)]
    pub force_legacy_mode: bool,

    /// URIs opted in to the decimal-places override for writes.
    #[serde(default)]
    pub ignore_decimal_overrides: Vec<String>,
}

fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    15
}

impl ConnectionSettings {
    /// Load settings from a TOML file (if given) merged with environment
    /// variables prefixed `HEARTH_`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let settings: Self = figment.merge(Env::prefixed("HEARTH_")).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "host".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Transport configuration for the device client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_from_toml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"192.168.0.25\"").unwrap();

        let settings = ConnectionSettings::load(Some(file.path())).unwrap();

        assert_eq!(settings.host, "192.168.0.25");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.timeout_secs, 15);
        assert!(!settings.force_legacy_mode);
        assert!(settings.ignore_decimal_overrides.is_empty());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "host = \"boiler.local\"\nport = 9090\ntimeout_secs = 5\nforce_legacy_mode = true\n\
             ignore_decimal_overrides = [\"/120/10111/0/0/12129\"]"
        )
        .unwrap();

        let settings = ConnectionSettings::load(Some(file.path())).unwrap();

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.transport().timeout.as_secs(), 5);
        assert!(settings.force_legacy_mode);
        assert_eq!(settings.ignore_decimal_overrides.len(), 1);
    }

    #[test]
    fn empty_host_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"\"").unwrap();

        let result = ConnectionSettings::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }
}
