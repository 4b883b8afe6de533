//! Line geometry for beams and marker colors for targets

use super::vertex::{Vertex, colors};
use crate::sim::{Beam, Target};

/// Alpha at the far end of a beam (fades from 1.0 at the emitter)
const BEAM_TAIL_ALPHA: f32 = 0.35;

/// Line-list vertices (two per segment) for a beam, fading along its length
pub fn beam_lines(beam: &Beam) -> Vec<Vertex> {
    if beam.vertices.len() < 2 {
        return Vec::new();
    }

    let base = colors::rgba(beam.color);
    let total = beam.length().max(f32::EPSILON);
    let mut travelled = 0.0;
    let mut vertices = Vec::with_capacity((beam.vertices.len() - 1) * 2);

    for seg in beam.vertices.windows(2) {
        let len = seg[0].distance(seg[1]);
        let a0 = fade(travelled / total);
        travelled += len;
        let a1 = fade(travelled / total);

        vertices.push(Vertex::new(seg[0].to_array(), with_alpha(base, a0)));
        vertices.push(Vertex::new(seg[1].to_array(), with_alpha(base, a1)));
    }
    vertices
}

fn fade(t: f32) -> f32 {
    crate::lerp(1.0, BEAM_TAIL_ALPHA, t.clamp(0.0, 1.0))
}

fn with_alpha(mut rgba: [f32; 4], alpha: f32) -> [f32; 4] {
    rgba[3] *= alpha;
    rgba
}

/// Marker color for a target: full color when lit, dimmed otherwise
pub fn target_color(target: &Target) -> [f32; 4] {
    let base = target.required_color().map_or(colors::ACCEPT_ANY, colors::rgba);
    if target.is_active() {
        base
    } else {
        colors::dim(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::sim::{BeamEnd, EntityId};
    use glam::Vec3;

    fn beam(vertices: Vec<Vec3>) -> Beam {
        Beam {
            emitter: EntityId(1),
            color: Color::Green,
            vertices,
            end: BeamEnd::ExhaustedReflections,
            bounces: 1,
        }
    }

    #[test]
    fn test_beam_lines_two_vertices_per_segment() {
        let b = beam(vec![Vec3::ZERO, Vec3::X * 2.0, Vec3::new(2.0, 2.0, 0.0)]);
        let lines = beam_lines(&b);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].color[3], 1.0);
        assert!((lines[1].color[3] - lines[2].color[3]).abs() < 1e-6, "segments join seamlessly");
        assert!((lines[3].color[3] - BEAM_TAIL_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn test_single_point_beam_draws_nothing() {
        assert!(beam_lines(&beam(vec![Vec3::ZERO])).is_empty());
    }

    #[test]
    fn test_target_color_dims_when_inactive() {
        let mut t = Target::new(EntityId(3), Color::Blue.into());
        assert_eq!(target_color(&t), colors::dim(colors::rgba(Color::Blue)));
        t.report_hit(Color::Blue, 0.0);
        assert_eq!(target_color(&t), colors::rgba(Color::Blue));
    }
}
