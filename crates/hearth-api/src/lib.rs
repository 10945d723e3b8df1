// hearth-api: Async Rust client for the XML web services of heating controllers

pub mod client;
pub mod error;
pub mod model;
pub mod transport;
pub mod xml;

pub use client::{DeviceClient, MAX_SCHEDULE_SLOT};
pub use error::Error;
pub use model::{ApiVersion, DeviceFault, MenuLeaf, MenuNode, MenuTree, ValueReading, VarType, VariableInfo};
pub use transport::TransportConfig;
