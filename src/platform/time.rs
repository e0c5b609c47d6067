//! Frame timing
//!
//! Converts animation-frame timestamps into per-frame deltas.

use crate::consts::MAX_FRAME_DT_MS;

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_timestamp: Option<f64>,
    max_dt_ms: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT_MS)
    }
}

impl FrameClock {
    pub fn new(max_dt_ms: f64) -> Self {
        Self {
            last_timestamp: None,
            max_dt_ms,
        }
    }

    /// Delta since the previous timestamp. The first frame after a reset is 0.
    pub fn advance(&mut self, timestamp_ms: f64) -> f64 {
        let dt = match self.last_timestamp {
            Some(last) => (timestamp_ms - last).clamp(0.0, self.max_dt_ms),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);
        if dt.is_nan() { 0.0 } else { dt }
    }

    /// Forget the last timestamp (new session or resumed tab)
    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }
}
