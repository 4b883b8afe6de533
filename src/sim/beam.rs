//! Beam tracing
//!
//! One trace per active emitter per tick: march from the emitter, bounce off
//! mirrors, stop at the first target, absorber or wall, or when the
//! reflection budget runs out. The result is a polyline plus how it ended.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::reflect;
use super::scene::{EntityId, EntityKind, RayHit, SceneQuery};
use crate::color::{Color, ColorFilter, matches};

/// A beam source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emitter {
    pub id: EntityId,
    pub origin: Vec3,
    /// Forward direction (normalized at trace time)
    pub direction: Vec3,
    /// Maximum travel per segment
    pub max_distance: f32,
    pub max_reflections: u32,
    pub color: Color,
    /// Switched through `LevelSession::set_emitter_active` once in a session
    #[serde(default = "default_true")]
    pub(crate) active: bool,
    /// Skip an immediate re-hit of the mirror just bounced off
    #[serde(default)]
    pub exclude_last_surface: bool,
}

fn default_true() -> bool {
    true
}

impl Emitter {
    pub fn new(id: EntityId, origin: Vec3, direction: Vec3, color: Color) -> Self {
        Self {
            id,
            origin,
            direction,
            max_distance: crate::consts::DEFAULT_MAX_DISTANCE,
            max_reflections: crate::consts::DEFAULT_MAX_REFLECTIONS,
            color,
            active: true,
            exclude_last_surface: false,
        }
    }

    pub fn with_limits(mut self, max_distance: f32, max_reflections: u32) -> Self {
        self.max_distance = max_distance;
        self.max_reflections = max_reflections;
        self
    }

    /// Initial on/off state
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// How a beam terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamEnd {
    /// Ran out into open space
    Unobstructed,
    /// Stopped on a target whose color filter accepted the beam
    HitTarget(EntityId),
    /// Stopped on an absorber
    HitAbsorber(EntityId),
    /// Stopped on a wall, a degenerate mirror, or a target that rejected the
    /// beam color (`wrong_color` names that target)
    HitOpaque { wrong_color: Option<EntityId> },
    /// Bounced more than the emitter allows
    ExhaustedReflections,
}

/// Polyline produced by one trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub emitter: EntityId,
    pub color: Color,
    /// Vertices, starting at the emitter origin
    pub vertices: Vec<Vec3>,
    pub end: BeamEnd,
    pub bounces: u32,
}

impl Beam {
    /// Final vertex of the polyline
    pub fn terminal(&self) -> Vec3 {
        self.vertices.last().copied().unwrap_or(Vec3::ZERO)
    }

    /// Target this beam is illuminating, if the color matched
    pub fn lit_target(&self) -> Option<EntityId> {
        match self.end {
            BeamEnd::HitTarget(id) => Some(id),
            _ => None,
        }
    }

    /// Total polyline length
    pub fn length(&self) -> f32 {
        self.vertices.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Lookup for the color filter of a target entity
pub trait TargetLookup {
    fn filter_for(&self, entity: EntityId) -> Option<ColorFilter>;
}

impl<F> TargetLookup for F
where
    F: Fn(EntityId) -> Option<ColorFilter>,
{
    fn filter_for(&self, entity: EntityId) -> Option<ColorFilter> {
        self(entity)
    }
}

/// Trace one beam for `emitter` through `scene`
///
/// `epsilon` is how far past a mirror the next segment starts.
/// A zero direction or non-positive `max_distance` yields a single-point
/// `Unobstructed` beam.
pub fn trace_beam<S, T>(emitter: &Emitter, scene: &S, targets: &T, epsilon: f32) -> Beam
where
    S: SceneQuery + ?Sized,
    T: TargetLookup + ?Sized,
{
    let mut beam = Beam {
        emitter: emitter.id,
        color: emitter.color,
        vertices: vec![emitter.origin],
        end: BeamEnd::Unobstructed,
        bounces: 0,
    };

    let forward = emitter.direction.normalize_or_zero();
    let max_distance = emitter.max_distance;
    if forward == Vec3::ZERO || !(max_distance > 0.0) {
        return beam;
    }

    let mut position = emitter.origin;
    let mut direction = forward;
    let mut last_mirror: Option<EntityId> = None;

    while beam.bounces <= emitter.max_reflections {
        let exclude = if emitter.exclude_last_surface { last_mirror } else { None };
        let Some(hit) = cast(scene, position, direction, max_distance, exclude, epsilon) else {
            beam.vertices.push(position + direction * max_distance);
            beam.end = BeamEnd::Unobstructed;
            return beam;
        };

        beam.vertices.push(hit.point);

        match hit.kind {
            EntityKind::Target => {
                beam.end = match targets.filter_for(hit.entity) {
                    Some(filter) if matches(emitter.color, filter) => BeamEnd::HitTarget(hit.entity),
                    Some(_) => BeamEnd::HitOpaque {
                        wrong_color: Some(hit.entity),
                    },
                    None => BeamEnd::HitOpaque { wrong_color: None },
                };
                return beam;
            }
            EntityKind::Mirror => match reflect(direction, hit.normal) {
                Some(reflected) => {
                    direction = reflected.normalize_or_zero();
                    position = hit.point + direction * epsilon;
                    last_mirror = Some(hit.entity);
                    beam.bounces += 1;
                }
                None => {
                    beam.end = BeamEnd::HitOpaque { wrong_color: None };
                    return beam;
                }
            },
            EntityKind::Absorber => {
                beam.end = BeamEnd::HitAbsorber(hit.entity);
                return beam;
            }
            EntityKind::Opaque => {
                beam.end = BeamEnd::HitOpaque { wrong_color: None };
                return beam;
            }
        }
    }

    beam.end = BeamEnd::ExhaustedReflections;
    beam
}

/// Raycast, optionally stepping past an immediate re-hit of `exclude`
fn cast<S>(
    scene: &S,
    position: Vec3,
    direction: Vec3,
    max_distance: f32,
    exclude: Option<EntityId>,
    epsilon: f32,
) -> Option<RayHit>
where
    S: SceneQuery + ?Sized,
{
    let hit = scene.raycast(position, direction, max_distance)?;
    match exclude {
        Some(id) if hit.entity == id && hit.point.distance(position) <= epsilon => {
            log::debug!("beam re-hit mirror {} immediately, stepping past it", id);
            scene.raycast(hit.point + direction * epsilon, direction, max_distance)
        }
        _ => Some(hit),
    }
}
