//! Platform abstraction layer
//!
//! Turns raw browser events into simulation input:
//! - Pointer/touch tracking
//! - Frame timing from animation-frame timestamps

pub mod input;
pub mod time;

pub use input::{PointerSample, PointerTracker};
pub use time::FrameClock;
