//! Scene queries
//!
//! The engine never owns geometry. It asks a [`SceneQuery`] for the nearest
//! hit along a ray and gets back an already-classified entity.
//! [`StaticScene`] is a small in-memory implementation used by the headless
//! driver and tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::{ray_disc, ray_plane, ray_sphere};

/// Handle to a scene entity, shared between the scene and the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classification of whatever a ray hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Mirror,
    Target,
    Absorber,
    Opaque,
}

/// Nearest intersection along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Surface normal at `point` (not necessarily normalized)
    pub normal: Vec3,
    pub kind: EntityKind,
    pub entity: EntityId,
}

/// Raycast capability supplied by the scene
pub trait SceneQuery {
    /// Nearest intersection from `origin` along `direction` within `max_distance`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

/// Shape of a [`SceneObject`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Flat round panel facing `normal`
    Disc { normal: Vec3, radius: f32 },
    Sphere { radius: f32 },
    /// Infinite plane through the object position
    Plane { normal: Vec3 },
}

/// One piece of geometry in a [`StaticScene`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
    pub shape: Shape,
}

impl SceneObject {
    /// Distance and normal of the hit, if any
    fn intersect(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        match self.shape {
            Shape::Disc { normal, radius } => {
                ray_disc(origin, dir, max_distance, self.position, normal, radius).map(|t| (t, normal))
            }
            Shape::Plane { normal } => {
                ray_plane(origin, dir, max_distance, self.position, normal).map(|t| (t, normal))
            }
            Shape::Sphere { radius } => ray_sphere(origin, dir, max_distance, self.position, radius)
                .map(|t| (t, (origin + dir * t - self.position).normalize_or_zero())),
        }
    }
}

/// Brute-force scene: tests every object against every ray
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticScene {
    pub objects: Vec<SceneObject>,
}

impl StaticScene {
    pub fn new() -> Self {
        Self { objects: Vec::new() }
    }

    pub fn add(&mut self, entity: EntityId, kind: EntityKind, position: Vec3, shape: Shape) {
        self.objects.push(SceneObject {
            entity,
            kind,
            position,
            shape,
        });
    }

    /// Add a round mirror facing `normal`
    pub fn add_mirror(&mut self, entity: EntityId, position: Vec3, normal: Vec3, radius: f32) {
        self.add(entity, EntityKind::Mirror, position, Shape::Disc { normal, radius });
    }

    /// Remove every object belonging to `entity` (e.g. a destroyed absorber)
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.entity != entity);
        self.objects.len() != before
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl SceneQuery for StaticScene {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        self.objects
            .iter()
            .filter_map(|o| o.intersect(origin, dir, max_distance).map(|(t, n)| (t, n, o)))
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(t, normal, o)| RayHit {
                point: origin + dir * t,
                normal,
                kind: o.kind,
                entity: o.entity,
            })
    }
}
