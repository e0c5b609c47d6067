//! Data-driven game balance
//!
//! Every number that shapes a session lives here so a host can ship a JSON
//! override without rebuilding. Missing fields fall back to the defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Balance constants for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Geometry ===
    pub player_size: Vec2,
    /// Gap between the player's bottom edge and the field's bottom edge
    pub player_bottom_margin: f32,
    pub enemy_size: Vec2,
    pub supply_size: Vec2,

    // === Enemies ===
    pub enemy_base_speed: f32,
    pub enemy_speed_per_level: f32,
    pub enemy_max_health: i32,
    pub enemy_base_spawn_interval_ms: f64,
    pub enemy_spawn_interval_step_ms: f64,
    pub enemy_min_spawn_interval_ms: f64,

    // === Supplies ===
    pub supply_fall_speed: f32,
    pub supply_check_interval_ms: f64,
    /// Chance a supply drops when the check fires
    pub supply_chance: f64,
    /// Share of drops that are score bonuses (the rest are weapons)
    pub score_bonus_chance: f64,
    pub score_bonus_points: u64,

    // === Scoring & progression ===
    pub kill_score: u64,
    pub points_per_level: u64,
    pub difficulty_step: f32,
    pub level_up_duration_ms: f64,

    // === Hitbox insets (per side) ===
    pub player_inset: f32,
    pub enemy_inset: f32,
    pub projectile_inset: f32,
    pub supply_inset: f32,

    // === Explosions ===
    pub explosion_lifetime_ms: f64,
    pub impact_explosion_base: f32,
    pub impact_explosion_per_power: f32,
    pub enemy_explosion_size: f32,
    pub player_explosion_size: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_size: Vec2::new(40.0, 40.0),
            player_bottom_margin: 20.0,
            enemy_size: Vec2::new(30.0, 30.0),
            supply_size: Vec2::new(20.0, 20.0),

            enemy_base_speed: 2.0,
            enemy_speed_per_level: 0.3,
            enemy_max_health: 3,
            enemy_base_spawn_interval_ms: 1500.0,
            enemy_spawn_interval_step_ms: 100.0,
            enemy_min_spawn_interval_ms: 500.0,

            supply_fall_speed: 1.5,
            supply_check_interval_ms: 5000.0,
            supply_chance: 0.4,
            score_bonus_chance: 0.6,
            score_bonus_points: 20,

            kill_score: 5,
            points_per_level: 1000,
            difficulty_step: 0.5,
            level_up_duration_ms: 2000.0,

            player_inset: 5.0,
            enemy_inset: 5.0,
            projectile_inset: 2.0,
            supply_inset: 2.0,

            explosion_lifetime_ms: 500.0,
            impact_explosion_base: 20.0,
            impact_explosion_per_power: 10.0,
            enemy_explosion_size: 40.0,
            player_explosion_size: 60.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the simulation's arithmetic
    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, size) in [
            ("player_size", self.player_size),
            ("enemy_size", self.enemy_size),
            ("supply_size", self.supply_size),
        ] {
            check_positive(field, size.x as f64)?;
            check_positive(field, size.y as f64)?;
        }

        check_positive("enemy_base_spawn_interval_ms", self.enemy_base_spawn_interval_ms)?;
        check_positive("enemy_min_spawn_interval_ms", self.enemy_min_spawn_interval_ms)?;
        check_positive("supply_check_interval_ms", self.supply_check_interval_ms)?;
        check_positive("level_up_duration_ms", self.level_up_duration_ms)?;
        check_positive("explosion_lifetime_ms", self.explosion_lifetime_ms)?;
        check_positive("points_per_level", self.points_per_level as f64)?;
        check_positive("enemy_max_health", self.enemy_max_health as f64)?;

        check_probability("supply_chance", self.supply_chance)?;
        check_probability("score_bonus_chance", self.score_bonus_chance)?;

        // Falling entities must reach the bottom edge to be culled
        check_positive("enemy_base_speed", self.enemy_base_speed as f64)?;
        check_positive("supply_fall_speed", self.supply_fall_speed as f64)?;

        for (field, value) in [
            ("enemy_speed_per_level", self.enemy_speed_per_level),
            ("difficulty_step", self.difficulty_step),
            ("player_inset", self.player_inset),
            ("enemy_inset", self.enemy_inset),
            ("projectile_inset", self.projectile_inset),
            ("supply_inset", self.supply_inset),
        ] {
            check_non_negative(field, value as f64)?;
        }

        Ok(())
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange { field, value })
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::OutOfRange { field, value })
    }
}
