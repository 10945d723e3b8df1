//! Endpoint discovery and classification for XML-REST heating controllers.
//!
//! Walks a device's hierarchical menu of data points over two incompatible
//! API dialects, resolves units, scales, ranges and writability, and sorts
//! every point into one of four typed buckets: float, switch, text,
//! writable. The host platform turns those buckets into entities; this
//! crate never holds them past a discovery pass.

pub mod adapter;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod units;

pub use adapter::Adapter;
pub use discovery::{ApiDialect, discover_into};
pub use endpoint::{
    DiscoveredEndpoints, EndpointRecord, EndpointType, EndpointValue, SwitchValueSpec,
    ValidValueSpec, ValueSpec,
};
pub use error::CoreError;
pub use units::{MINUTES_SINCE_MIDNIGHT, PhysicalQuantity, normalize_unit, quantity_for_unit};
