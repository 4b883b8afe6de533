//! Level definitions
//!
//! A level file describes the emitters, targets and absorbers the engine
//! tracks, the completion requirement, the gate, and (for headless runs)
//! the scene geometry the beams travel through.

use std::collections::BTreeSet;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorFilter};
use crate::error::{ConfigError, ConfigResult};
use crate::settings::EngineSettings;
use crate::sim::{
    Absorber, EntityId, Emitter, GateConfig, LevelRequirement, LevelSession, StaticScene, Target,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterDef {
    pub id: EntityId,
    pub origin: Vec3,
    pub direction: Vec3,
    pub color: Color,
    #[serde(default)]
    pub max_distance: Option<f32>,
    #[serde(default)]
    pub max_reflections: Option<u32>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub exclude_last_surface: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDef {
    pub id: EntityId,
    /// Omitted: accepts any color
    #[serde(default)]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsorberDef {
    pub id: EntityId,
    #[serde(default)]
    pub max_hits: Option<u32>,
    #[serde(default)]
    pub fragile: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub name: String,
    #[serde(default)]
    pub requirement: LevelRequirement,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub emitters: Vec<EmitterDef>,
    #[serde(default)]
    pub targets: Vec<TargetDef>,
    #[serde(default)]
    pub absorbers: Vec<AbsorberDef>,
    #[serde(default)]
    pub scene: StaticScene,
}

impl LevelDefinition {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&json)?;
        log::info!("Loaded level '{}' from {}", level.name, path.display());
        Ok(level)
    }

    /// Reject data the engine cannot run. A required color with no targets
    /// is allowed here; the session warns about it and fails closed.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = BTreeSet::new();
        let ids = self
            .emitters
            .iter()
            .map(|e| e.id)
            .chain(self.targets.iter().map(|t| t.id))
            .chain(self.absorbers.iter().map(|a| a.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateEntity(id));
            }
        }

        for e in &self.emitters {
            if e.direction.length_squared() < crate::sim::geometry::DEGENERATE_LENGTH_SQ {
                return Err(ConfigError::ZeroDirection(e.id));
            }
            if let Some(distance) = e.max_distance {
                if !(distance > 0.0 && distance.is_finite()) {
                    return Err(ConfigError::InvalidDistance { id: e.id, distance });
                }
            }
        }
        Ok(())
    }

    /// Build a fresh session for this level
    pub fn to_session(&self, settings: &EngineSettings) -> LevelSession {
        let mut session = LevelSession::new(
            self.name.clone(),
            self.requirement.clone(),
            self.gate.clone(),
            settings.clone(),
        );

        for def in &self.emitters {
            let mut emitter = Emitter::new(def.id, def.origin, def.direction, def.color)
                .with_limits(
                    def.max_distance.unwrap_or(settings.default_max_distance),
                    def.max_reflections.unwrap_or(settings.default_max_reflections),
                )
                .with_active(def.active);
            emitter.exclude_last_surface = def.exclude_last_surface;
            session.add_emitter(emitter);
        }
        for def in &self.targets {
            let filter = def.color.map_or(ColorFilter::Any, ColorFilter::Exactly);
            session.add_target(Target::new(def.id, filter));
        }
        for def in &self.absorbers {
            let absorber = if def.fragile {
                Absorber::fragile(def.id)
            } else {
                Absorber::new(def.id, def.max_hits.unwrap_or(1))
            };
            session.add_absorber(absorber);
        }
        session
    }
}
