// ── Host-facing adapter ──
//
// Ties the device client, the discovery walkers, and the write scaling
// together behind the surface the host platform consumes: probe, discover,
// read, write, faults. One adapter per device; no state is shared across
// adapters, so independent devices can be driven concurrently.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use hearth_api::{DeviceClient, DeviceFault, ValueReading};

use crate::discovery::{self, ApiDialect};
use crate::endpoint::{DiscoveredEndpoints, EndpointRecord};
use crate::error::CoreError;
use crate::units;

/// Adapter for one heating controller.
pub struct Adapter {
    client: DeviceClient,
    force_legacy: bool,
    /// URIs opted in to the decimal-places override (finer write precision
    /// than the device declares; may round unexpectedly on the device).
    ignore_decimal_uris: HashSet<String>,
}

impl Adapter {
    pub fn new(client: DeviceClient) -> Self {
        Self {
            client,
            force_legacy: false,
            ignore_decimal_uris: HashSet::new(),
        }
    }

    /// Force the v1.1 discovery strategy regardless of the probed version.
    pub fn with_force_legacy(mut self, force_legacy: bool) -> Self {
        self.force_legacy = force_legacy;
        self
    }

    /// Register the per-endpoint decimal-override opt-ins.
    pub fn with_ignore_decimal_overrides<I>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.ignore_decimal_uris = uris.into_iter().collect();
        self
    }

    /// The underlying device client.
    pub fn client(&self) -> &DeviceClient {
        &self.client
    }

    // ── Discovery ────────────────────────────────────────────────────

    /// Probe the device's API version and pick the discovery dialect.
    ///
    /// A device-reported error on the version resource means the firmware
    /// predates it, which is itself a v1.1 signal; transport failures
    /// propagate.
    pub async fn probe_dialect(&self) -> Result<ApiDialect, CoreError> {
        if self.force_legacy {
            debug!("legacy mode forced by configuration");
            return Ok(ApiDialect::V11);
        }
        match self.client.api_version().await {
            Ok(version) => {
                let dialect = ApiDialect::for_version(version);
                debug!(%version, %dialect, "probed device API version");
                Ok(dialect)
            }
            Err(err) if err.is_device_reported() => {
                warn!("device does not expose an API version; assuming v1.1");
                Ok(ApiDialect::V11)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Run one full discovery pass and return the four collections.
    pub async fn discover(&self, dialect: ApiDialect) -> Result<DiscoveredEndpoints, CoreError> {
        let mut out = DiscoveredEndpoints::default();
        discovery::discover_into(&self.client, dialect, &mut out).await?;
        info!(
            dialect = %dialect,
            float = out.float.len(),
            switches = out.switches.len(),
            text = out.text.len(),
            writable = out.writable.len(),
            "discovery pass complete"
        );
        Ok(out)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch an endpoint's current reading (poll path).
    pub async fn read(&self, uri: &str) -> Result<ValueReading, CoreError> {
        Ok(self.client.fetch_value(uri).await?)
    }

    /// Fetch an endpoint's current value scaled to physical units.
    pub async fn read_scaled(&self, uri: &str) -> Result<f64, CoreError> {
        Ok(self.read(uri).await?.scaled())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Write a physical value to a writable endpoint, applying the
    /// endpoint's scale and decimal rules before transmission.
    pub async fn write_scaled(
        &self,
        record: &EndpointRecord,
        value: f64,
        force_decimals: bool,
    ) -> Result<(), CoreError> {
        let spec = record.writable_spec().ok_or_else(|| CoreError::NotWritable {
            uri: record.uri.clone(),
        })?;

        let ignore = self.ignore_decimal_uris.contains(&record.uri);
        if ignore || force_decimals {
            debug!(uri = %record.uri, "decimal-places restriction overridden for write");
        }
        let raw = units::scale_for_write(
            value,
            spec.dec_places,
            spec.scale_factor,
            ignore,
            force_decimals,
        );
        self.write_raw(&record.uri, raw as f64, None, None).await
    }

    /// Flip a switch endpoint on or off using its device codes.
    pub async fn set_switch(&self, record: &EndpointRecord, on: bool) -> Result<(), CoreError> {
        let spec = record.switch_spec().ok_or_else(|| CoreError::NotASwitch {
            uri: record.uri.clone(),
        })?;
        let code = if on { spec.on_value } else { spec.off_value };
        self.write_raw(&record.uri, code as f64, None, None).await
    }

    /// Write a raw (already scaled) value, optionally targeting a
    /// time-program slot range. A device-side rejection surfaces as
    /// `WriteRejected` so the caller can report the failed intent.
    pub async fn write_raw(
        &self,
        uri: &str,
        raw_value: f64,
        begin: Option<u8>,
        end: Option<u8>,
    ) -> Result<(), CoreError> {
        let applied = self.client.write_value(uri, raw_value, begin, end).await?;
        if applied {
            Ok(())
        } else {
            Err(CoreError::WriteRejected {
                uri: uri.to_owned(),
            })
        }
    }

    // ── Metadata helpers ─────────────────────────────────────────────

    /// Step size for user input on a writable endpoint, honouring the
    /// per-endpoint decimal override.
    pub fn step_size_for(&self, record: &EndpointRecord) -> Option<f64> {
        let spec = record.writable_spec()?;
        let ignore = self.ignore_decimal_uris.contains(&record.uri);
        Some(units::step_size(spec.dec_places, spec.scale_factor, ignore))
    }

    // ── Faults ───────────────────────────────────────────────────────

    /// The device's active fault list, oldest first.
    pub async fn faults(&self) -> Result<Vec<DeviceFault>, CoreError> {
        Ok(self.client.fetch_faults().await?)
    }
}
