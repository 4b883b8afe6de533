//! Engine settings
//!
//! Tunables shared by every level. Stored as JSON; missing fields fall back
//! to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Fixed simulation timestep (seconds)
    pub sim_dt: f32,
    /// Maximum ticks run per frame
    pub max_substeps: u32,
    /// How long a target stays lit without a fresh matching hit (seconds)
    pub staleness_threshold: f64,
    /// Offset past a mirror before the next segment is cast
    pub reflection_epsilon: f32,
    /// Used by emitters that do not set their own
    pub default_max_distance: f32,
    pub default_max_reflections: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sim_dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            staleness_threshold: STALENESS_THRESHOLD,
            reflection_epsilon: REFLECTION_EPSILON,
            default_max_distance: DEFAULT_MAX_DISTANCE,
            default_max_reflections: DEFAULT_MAX_REFLECTIONS,
        }
    }
}

impl EngineSettings {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.sim_dt > 0.0) {
            return Err(invalid("sim_dt", format!("must be positive, got {}", self.sim_dt)));
        }
        if self.max_substeps == 0 {
            return Err(invalid("max_substeps", "must be at least 1".to_string()));
        }
        if !(self.staleness_threshold > 0.0) {
            return Err(invalid(
                "staleness_threshold",
                format!("must be positive, got {}", self.staleness_threshold),
            ));
        }
        if !(self.reflection_epsilon >= 0.0) {
            return Err(invalid(
                "reflection_epsilon",
                format!("must be non-negative, got {}", self.reflection_epsilon),
            ));
        }
        if !(self.default_max_distance > 0.0) {
            return Err(invalid(
                "default_max_distance",
                format!("must be positive, got {}", self.default_max_distance),
            ));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidSetting { name, reason }
}
