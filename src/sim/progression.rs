//! Level, token and difficulty progression
//!
//! Level and tokens are pure functions of the score. The tracker only
//! remembers the last values it derived so it can tell when a threshold was
//! crossed; re-deriving from the same score never applies anything twice.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// `floor(score / points_per_level) + 1`
#[inline]
pub fn level_for_score(score: u64, points_per_level: u64) -> u32 {
    let level = score / points_per_level.max(1) + 1;
    level.min(u32::MAX as u64) as u32
}

/// `floor(score / points_per_level)`
#[inline]
pub fn tokens_for_score(score: u64, points_per_level: u64) -> u64 {
    score / points_per_level.max(1)
}

/// What changed after observing a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressionUpdate {
    /// New level, if it went up
    pub level_up: Option<u32>,
    /// New token total, if it went up
    pub tokens: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    tokens: u64,
    /// Divides the enemy spawn interval
    difficulty: f32,
    /// Time the level-up banner has been showing, `None` when hidden
    level_up_elapsed_ms: Option<f64>,
    points_per_level: u64,
    difficulty_step: f32,
    level_up_duration_ms: f64,
}

impl Progression {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            level: 1,
            tokens: 0,
            difficulty: 1.0,
            level_up_elapsed_ms: None,
            points_per_level: tuning.points_per_level,
            difficulty_step: tuning.difficulty_step,
            level_up_duration_ms: tuning.level_up_duration_ms,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// Whether the level-up banner is currently showing
    pub fn level_up_active(&self) -> bool {
        self.level_up_elapsed_ms.is_some()
    }

    /// Re-derive level and tokens from `score`.
    ///
    /// A level increase restarts the banner and raises difficulty by one step,
    /// however many levels were skipped at once.
    pub fn observe_score(&mut self, score: u64) -> ProgressionUpdate {
        let mut update = ProgressionUpdate::default();

        let level = level_for_score(score, self.points_per_level);
        if level > self.level {
            self.level = level;
            self.level_up_elapsed_ms = Some(0.0);
            self.difficulty += self.difficulty_step;
            log::info!("Level up: {} (difficulty {:.1})", level, self.difficulty);
            update.level_up = Some(level);
        }

        let tokens = tokens_for_score(score, self.points_per_level);
        if tokens > self.tokens {
            self.tokens = tokens;
            log::info!("Token awarded: {} total", tokens);
            update.tokens = Some(tokens);
        }

        update
    }

    /// Advance the banner countdown. Runs even while paused.
    pub fn decay(&mut self, dt_ms: f64) {
        if let Some(elapsed) = self.level_up_elapsed_ms.as_mut() {
            *elapsed += dt_ms;
            if *elapsed > self.level_up_duration_ms {
                self.level_up_elapsed_ms = None;
            }
        }
    }
}
