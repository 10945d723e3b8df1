//! Configuration for hearth.
//!
//! Two concerns live here: loading connection settings (TOML file +
//! environment), and migrating the versioned configuration snapshot the
//! host platform persists for each device. The migrator is the only
//! stateful-looking part and is still pure: it maps an old
//! `(data, options)` pair to a new one plus a target schema version, and
//! the host does the single write-back.

use thiserror::Error;

mod migrate;
mod schema;
mod settings;

pub use migrate::{ConfigData, MigrationError, MigrationOutcome, SCHEMA_VERSION, migrate_entry};
pub use schema::{PersistedConfig, keys};
pub use settings::ConnectionSettings;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("malformed persisted entry: {0}")]
    Persisted(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
