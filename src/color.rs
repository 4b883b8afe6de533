//! Beam and target colors
//!
//! The color set is closed. Matching is exact identity, never a distance.

use serde::{Deserialize, Serialize};

/// Beam/target color identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Pink,
    White,
    Black,
}

impl Color {
    /// Every color, in declaration order
    pub const ALL: [Color; 8] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Pink,
        Color::White,
        Color::Black,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
            Color::Orange => "Orange",
            Color::Pink => "Pink",
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

/// What a target will accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorFilter {
    /// Only beams of exactly this color
    Exactly(Color),
    /// Any beam color activates the target
    Any,
}

impl ColorFilter {
    /// The specific color this filter requires, if any
    pub fn required(&self) -> Option<Color> {
        match self {
            ColorFilter::Exactly(c) => Some(*c),
            ColorFilter::Any => None,
        }
    }

    #[inline]
    pub fn accepts_any(&self) -> bool {
        matches!(self, ColorFilter::Any)
    }
}

impl From<Color> for ColorFilter {
    fn from(color: Color) -> Self {
        ColorFilter::Exactly(color)
    }
}

/// Does a beam of `beam` color satisfy `filter`?
#[inline]
pub fn matches(beam: Color, filter: ColorFilter) -> bool {
    match filter {
        ColorFilter::Any => true,
        ColorFilter::Exactly(required) => beam == required,
    }
}
