//! Ray intersection math for the reference scene
//!
//! All functions take a normalized ray direction and return the distance
//! along the ray to the first intersection, if it lies within `max_distance`.

use glam::Vec3;

/// Below this, a vector is treated as zero-length
pub const DEGENERATE_LENGTH_SQ: f32 = 1e-12;

/// Below this, a ray is considered parallel to a plane
const PARALLEL_EPSILON: f32 = 1e-6;

/// Reflect a direction off a surface: d' = d - 2(d·n)n
///
/// `normal` is normalized here, so callers may pass any non-zero normal.
/// Returns `None` for a degenerate (zero-length) normal.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Option<Vec3> {
    if normal.length_squared() < DEGENERATE_LENGTH_SQ {
        return None;
    }
    let n = normal.normalize();
    Some(direction - 2.0 * direction.dot(n) * n)
}

/// Intersect a ray with an infinite plane
pub fn ray_plane(origin: Vec3, dir: Vec3, max_distance: f32, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = dir.dot(normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (point - origin).dot(normal) / denom;
    (t >= 0.0 && t <= max_distance).then_some(t)
}

/// Intersect a ray with a flat disc (a round mirror or panel)
pub fn ray_disc(
    origin: Vec3,
    dir: Vec3,
    max_distance: f32,
    center: Vec3,
    normal: Vec3,
    radius: f32,
) -> Option<f32> {
    let t = ray_plane(origin, dir, max_distance, center, normal)?;
    let hit = origin + dir * t;
    ((hit - center).length_squared() <= radius * radius).then_some(t)
}

/// Intersect a ray with a sphere, returning the nearest non-negative hit
pub fn ray_sphere(origin: Vec3, dir: Vec3, max_distance: f32, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    let far = -b + sqrt_disc;
    // Origin inside the sphere hits the far wall
    let t = if near >= 0.0 { near } else { far };
    (t >= 0.0 && t <= max_distance).then_some(t)
}
