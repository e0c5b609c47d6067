//! Horde Shooter - a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation (spawning, weapons, collisions, progression, session)
//! - `platform`: Pointer input and frame timing plumbing
//! - `verify`: Identity-verification gate in front of the game
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod verify;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Duration of one reference frame (60 Hz). Entity speeds are expressed
    /// in play-field units per reference frame.
    pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest frame delta fed to the simulation (e.g. after a hidden tab)
    pub const MAX_FRAME_DT_MS: f64 = 250.0;

    /// Fallback play-field when the host has not measured its container yet
    pub const DEFAULT_FIELD_WIDTH: f32 = 400.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 700.0;
}

/// Width of the range an entity's left edge may occupy inside a field.
///
/// Degenerates to zero when the entity is at least as wide as the field, so
/// random draws and clamps never see a negative range.
#[inline]
pub fn placement_span(field_extent: f32, entity_extent: f32) -> f32 {
    (field_extent - entity_extent).max(0.0)
}

/// Clamp an entity's left edge so it stays within `[0, field - size]`
#[inline]
pub fn clamp_to_field(x: f32, field_extent: f32, entity_extent: f32) -> f32 {
    x.clamp(0.0, placement_span(field_extent, entity_extent))
}

/// Center of an axis-aligned box given its top-left corner and size
#[inline]
pub fn box_center(pos: Vec2, size: Vec2) -> Vec2 {
    pos + size * 0.5
}
