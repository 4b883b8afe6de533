//! Render-facing output
//!
//! The engine does not draw anything. This module turns beams and target
//! states into plain vertex data a renderer can upload as-is.

pub mod shapes;
pub mod vertex;

pub use shapes::{beam_lines, target_color};
pub use vertex::{Vertex, colors};
