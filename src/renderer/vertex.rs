//! Vertex types for beam rendering

use bytemuck::{Pod, Zeroable};

/// 3D line vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    /// Byte stride of one vertex in a buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for beams and targets
pub mod colors {
    use crate::color::Color;

    /// Brightness multiplier for unlit targets
    pub const DIM_FACTOR: f32 = 0.3;

    pub const ACCEPT_ANY: [f32; 4] = [0.85, 0.85, 0.85, 1.0];

    pub fn rgba(color: Color) -> [f32; 4] {
        match color {
            Color::Red => [1.0, 0.15, 0.1, 1.0],
            Color::Blue => [0.15, 0.35, 1.0, 1.0],
            Color::Green => [0.1, 0.9, 0.3, 1.0],
            Color::Yellow => [1.0, 0.9, 0.15, 1.0],
            Color::Orange => [1.0, 0.55, 0.1, 1.0],
            Color::Pink => [1.0, 0.45, 0.75, 1.0],
            Color::White => [1.0, 1.0, 1.0, 1.0],
            Color::Black => [0.08, 0.08, 0.1, 1.0],
        }
    }

    /// Darkened variant of a color (alpha kept)
    pub fn dim(rgba: [f32; 4]) -> [f32; 4] {
        [rgba[0] * DIM_FACTOR, rgba[1] * DIM_FACTOR, rgba[2] * DIM_FACTOR, rgba[3]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 7 * 4);
        let verts = [Vertex::new([1.0, 2.0, 3.0], colors::rgba(Color::Red))];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), Vertex::STRIDE);
    }

    #[test]
    fn test_dim_keeps_alpha() {
        let d = colors::dim(colors::rgba(Color::White));
        assert_eq!(d[3], 1.0);
        assert!((d[0] - colors::DIM_FACTOR).abs() < 1e-6);
    }
}
