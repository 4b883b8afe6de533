//! Errors from loading settings and level data
//!
//! The simulation itself never fails; only reading and validating input
//! files can.

use std::path::PathBuf;

use crate::sim::EntityId;

/// Alias for `Result<T, ConfigError>`.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entities in one level share an id.
    #[error("duplicate entity id {0}")]
    DuplicateEntity(EntityId),

    /// An emitter has a zero-length direction.
    #[error("emitter {0} has no direction")]
    ZeroDirection(EntityId),

    /// An emitter's travel distance is not a positive finite number.
    #[error("emitter {id} has invalid max distance {distance}")]
    InvalidDistance { id: EntityId, distance: f32 },

    /// A setting is out of range.
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}
