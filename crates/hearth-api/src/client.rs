// Device HTTP client
//
// Wraps `reqwest::Client` with controller-specific URL construction and
// XML envelope handling. Every call is a single request/response with no
// retry; transport failures propagate as typed errors and the caller
// decides whether to skip the endpoint or abort the pass.

use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::model::{ApiVersion, DeviceFault, MenuTree, ValueReading, VariableInfo};
use crate::transport::TransportConfig;
use crate::xml::{self, Element};

/// Highest time-program slot index (a day split into 15-minute slots).
pub const MAX_SCHEDULE_SLOT: u8 = 96;

/// Raw HTTP client for a heating controller's XML web services.
///
/// All resources live under `/user/` on the device's plain-HTTP port.
/// Responses share one envelope shape: a root element wrapping the payload,
/// with an `<error>` element anywhere in the tree signalling a
/// device-reported failure for that resource.
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceClient {
    /// Create a new client for the device at `host:port`.
    pub fn new(host: &str, port: u16, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{host}:{port}"))?;
        Ok(Self {
            http: transport.build_client()?,
            base_url,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and base URL.
    ///
    /// Used by tests to point the client at a mock server.
    pub fn with_base_url(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a device resource path.
    ///
    /// `uri` values from the menu keep their leading slash, so value URLs
    /// come out as `/user/var//120/...` -- the double slash is what the
    /// device itself links to and expects back.
    fn resource_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// The canonical read/write URL for a data point, as stored on records.
    pub fn value_path(uri: &str) -> String {
        format!("/user/var/{uri}")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a resource and parse the XML body.
    async fn get_document(&self, path: &str) -> Result<Element, Error> {
        let url = self.resource_url(path)?;
        debug!("GET {url}");
        let body = self.http.get(url).send().await?.text().await?;
        xml::parse(&body)
    }

    /// Extract a device-reported `<error>` from a parsed response, if any.
    fn device_error(root: &Element, uri: &str) -> Option<Error> {
        root.find("error").map(|e| Error::Device {
            uri: uri.to_owned(),
            message: if e.text.is_empty() {
                e.attr("msg").unwrap_or("unspecified device error").to_owned()
            } else {
                e.text.clone()
            },
        })
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the API version the device speaks.
    ///
    /// `GET /user/api`
    pub async fn api_version(&self) -> Result<ApiVersion, Error> {
        let root = self.get_document("/user/api").await?;
        if let Some(err) = Self::device_error(&root, "/user/api") {
            return Err(err);
        }
        ApiVersion::from_element(&root)
    }

    /// Fetch the full menu of data points.
    ///
    /// `GET /user/menu`. A failure here aborts discovery -- without the
    /// menu there are no leaves to walk. An empty `<menu>` is a valid
    /// empty tree, not an error.
    pub async fn fetch_menu(&self) -> Result<MenuTree, Error> {
        let root = self.get_document("/user/menu").await?;
        if let Some(err) = Self::device_error(&root, "/user/menu") {
            return Err(err);
        }
        MenuTree::from_element(&root)
    }

    /// Fetch a data point's metadata descriptor (dialect v1.2 only).
    ///
    /// `GET /user/varinfo/{uri}`. Returns `Ok(None)` when the device
    /// reports an error for the URI -- menus routinely list points that do
    /// not actually exist, and callers must skip those without aborting
    /// the traversal.
    pub async fn fetch_metadata(&self, uri: &str) -> Result<Option<VariableInfo>, Error> {
        let root = self.get_document(&format!("/user/varinfo/{uri}")).await?;
        if let Some(err) = Self::device_error(&root, uri) {
            warn!(%uri, "device reported an error for metadata request: {err}");
            return Ok(None);
        }
        VariableInfo::from_element(&root).map(Some)
    }

    /// Fetch a data point's current value.
    ///
    /// `GET /user/var/{uri}`
    pub async fn fetch_value(&self, uri: &str) -> Result<ValueReading, Error> {
        let root = self.get_document(&Self::value_path(uri)).await?;
        if let Some(err) = Self::device_error(&root, uri) {
            return Err(err);
        }
        ValueReading::from_element(&root)
    }

    /// Write a new raw (already scaled) value to a data point.
    ///
    /// `POST /user/var/{uri}` with a form-encoded `value` field.
    /// `begin`/`end` are optional time-program slot indices in
    /// `0..=96`; they are only meaningful for schedule endpoints.
    ///
    /// Returns `Ok(false)` on a device-reported rejection so callers can
    /// surface a user-facing failure without treating it as a transport
    /// fault.
    pub async fn write_value(
        &self,
        uri: &str,
        raw_value: f64,
        begin: Option<u8>,
        end: Option<u8>,
    ) -> Result<bool, Error> {
        for slot in [begin, end].into_iter().flatten() {
            if slot > MAX_SCHEDULE_SLOT {
                return Err(Error::InvalidSlot { value: slot });
            }
        }

        let mut form: Vec<(&str, String)> = vec![("value", format_raw(raw_value))];
        if let Some(begin) = begin {
            form.push(("begin", begin.to_string()));
        }
        if let Some(end) = end {
            form.push(("end", end.to_string()));
        }

        let url = self.resource_url(&Self::value_path(uri))?;
        debug!("POST {url}");
        let body = self.http.post(url).form(&form).send().await?.text().await?;
        let root = xml::parse(&body)?;

        if let Some(err) = Self::device_error(&root, uri) {
            warn!(%uri, "device rejected write: {err}");
            return Ok(false);
        }
        Ok(true)
    }

    /// Fetch the device's active fault list, oldest first.
    ///
    /// `GET /user/errors`
    pub async fn fetch_faults(&self) -> Result<Vec<DeviceFault>, Error> {
        let root = self.get_document("/user/errors").await?;
        if let Some(err) = Self::device_error(&root, "/user/errors") {
            return Err(err);
        }
        crate::model::faults_from_element(&root)
    }
}

/// Format a raw value for the wire: integral values without a fraction.
fn format_raw(raw: f64) -> String {
    if raw.fract() == 0.0 && raw.abs() < 1e15 {
        format!("{}", raw as i64)
    } else {
        format!("{raw}")
    }
}
