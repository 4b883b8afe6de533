//! Beam Gate - reflective-beam puzzle engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (beam tracing, targets, completion, exit gate)
//! - `color`: Closed beam/target color set and matching
//! - `level`: Level data files
//! - `settings`: Engine tunables
//! - `renderer`: Vertex export for drawing beams

pub mod color;
pub mod error;
pub mod level;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use color::{Color, ColorFilter};
pub use error::{ConfigError, ConfigResult};
pub use level::LevelDefinition;
pub use settings::EngineSettings;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Seconds a target stays lit after its last matching hit
    pub const STALENESS_THRESHOLD: f64 = 0.1;
    /// Offset past a mirror so the next segment doesn't re-hit it
    pub const REFLECTION_EPSILON: f32 = 1e-3;

    /// Emitter defaults
    pub const DEFAULT_MAX_DISTANCE: f32 = 100.0;
    pub const DEFAULT_MAX_REFLECTIONS: u32 = 8;

    /// Gate swing
    pub const GATE_ANIMATION_SECS: f64 = 1.0;
    pub const GATE_OPEN_ANGLE_DEG: f32 = 90.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Ease-in-out curve on [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
