//! Pointer input
//!
//! Mouse and touch are folded into one pointer: a last known position plus
//! a pressed flag. The position is in play-field coordinates (the host
//! subtracts the container's offset before calling in).

use glam::Vec2;

use crate::sim::TickInput;

/// The pointer as the simulation sees it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    /// Last known position, `None` until the first press
    pub position: Option<Vec2>,
    pub pressed: bool,
}

/// Accumulates pointer events between frames
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    sample: PointerSample,
    /// One-shot pause request, consumed by the next frame
    pause_requested: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Touch start or primary mouse button down
    pub fn press(&mut self, x: f32, y: f32) {
        self.sample.pressed = true;
        self.sample.position = Some(Vec2::new(x, y));
    }

    /// Touch move (always tracked)
    pub fn touch_moved(&mut self, x: f32, y: f32) {
        self.sample.position = Some(Vec2::new(x, y));
    }

    /// Mouse move; only tracked while the primary button is held
    pub fn mouse_moved(&mut self, x: f32, y: f32, primary_down: bool) {
        if primary_down {
            self.sample.position = Some(Vec2::new(x, y));
        }
    }

    /// Touch end/cancel, mouse up or pointer left the container
    pub fn release(&mut self) {
        self.sample.pressed = false;
    }

    pub fn request_pause(&mut self) {
        self.pause_requested = true;
    }

    pub fn sample(&self) -> PointerSample {
        self.sample
    }

    /// Build this frame's tick input. The player is centered under the pointer.
    pub fn take_input(&mut self, player_width: f32) -> TickInput {
        let input = TickInput {
            target_x: self.sample.position.map(|p| p.x - player_width / 2.0),
            firing: self.sample.pressed,
            pause: self.pause_requested,
        };
        self.pause_requested = false;
        input
    }
}
