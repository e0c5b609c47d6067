//! Axis-aligned boxes for overlap testing
//!
//! Screen space: origin at the top-left of the play-field, y grows downward.
//! Hitboxes are the visual bounds shrunk by a per-side inset so grazing
//! contacts don't count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its four edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Box from a top-left corner and a size
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            left: pos.x,
            top: pos.y,
            right: pos.x + size.x,
            bottom: pos.y + size.y,
        }
    }

    /// Shrink every side by `amount`
    #[inline]
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            left: self.left + amount,
            top: self.top + amount,
            right: self.right - amount,
            bottom: self.bottom - amount,
        }
    }

    /// True when the box has no area
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Strict overlap: touching edges do not count.
    ///
    /// A box inset past its own center is empty and overlaps nothing.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }
}
