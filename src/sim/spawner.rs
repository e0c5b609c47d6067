//! Enemy and supply spawning
//!
//! Two independent accumulators: enemies arrive on an interval that shrinks
//! with level and difficulty, supplies get a chance to drop every few seconds.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Enemy, EntityIds, Supply, SupplyEffect};
use super::weapon::WeaponKind;
use crate::placement_span;
use crate::tuning::Tuning;

/// Level-gated weapon bands, in ascending roll threshold.
///
/// The first band whose level requirement is met and whose threshold exceeds
/// the roll wins. Reordering these changes the drop odds.
const WEAPON_BANDS: [(u32, f32, WeaponKind); 4] = [
    (5, 0.2, WeaponKind::Powerful),
    (4, 0.4, WeaponKind::Triple),
    (3, 0.6, WeaponKind::Rapid),
    (2, 0.8, WeaponKind::Double),
];

/// Pick the weapon a supply carries for a uniform `roll` in `[0, 1)`
pub fn weapon_for_roll(level: u32, roll: f32) -> WeaponKind {
    WEAPON_BANDS
        .iter()
        .find(|&&(min_level, threshold, _)| level >= min_level && roll < threshold)
        .map(|&(_, _, weapon)| weapon)
        .unwrap_or(WeaponKind::Basic)
}

/// Time between enemies: `max(base - level * step, min) / difficulty`
pub fn enemy_spawn_interval(level: u32, difficulty: f32, tuning: &Tuning) -> f64 {
    let base = tuning.enemy_base_spawn_interval_ms
        - level as f64 * tuning.enemy_spawn_interval_step_ms;
    base.max(tuning.enemy_min_spawn_interval_ms) / (difficulty as f64).max(f64::EPSILON)
}

/// Per-tick inputs the spawner scales with
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    pub dt_ms: f64,
    pub level: u32,
    pub difficulty: f32,
    pub field_width: f32,
}

/// Entities created by one spawner step
#[derive(Debug, Clone, Default)]
pub struct SpawnBatch {
    pub enemy: Option<Enemy>,
    pub supply: Option<Supply>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    /// Time since the last enemy
    enemy_timer_ms: f64,
    /// Time since the last supply check
    supply_timer_ms: f64,
}

impl Spawner {
    /// Advance both timers and create whatever is due
    pub fn advance(
        &mut self,
        ctx: SpawnContext,
        tuning: &Tuning,
        ids: &mut EntityIds,
        rng: &mut impl Rng,
    ) -> SpawnBatch {
        let mut batch = SpawnBatch::default();

        self.enemy_timer_ms += ctx.dt_ms;
        if self.enemy_timer_ms > enemy_spawn_interval(ctx.level, ctx.difficulty, tuning) {
            self.enemy_timer_ms = 0.0;
            batch.enemy = Some(spawn_enemy(ctx, tuning, ids, rng));
        }

        self.supply_timer_ms += ctx.dt_ms;
        if self.supply_timer_ms > tuning.supply_check_interval_ms {
            self.supply_timer_ms = 0.0;
            if rng.random::<f64>() < tuning.supply_chance {
                batch.supply = Some(spawn_supply(ctx, tuning, ids, rng));
            }
        }

        batch
    }
}

fn spawn_enemy(
    ctx: SpawnContext,
    tuning: &Tuning,
    ids: &mut EntityIds,
    rng: &mut impl Rng,
) -> Enemy {
    let size = tuning.enemy_size;
    let x = rng.random::<f32>() * placement_span(ctx.field_width, size.x);
    let health = (ctx.level.min(i32::MAX as u32) as i32).clamp(1, tuning.enemy_max_health);
    Enemy {
        id: ids.next(),
        // Starts just above the visible field
        pos: Vec2::new(x, -size.y),
        size,
        health,
        speed: tuning.enemy_base_speed + ctx.level as f32 * tuning.enemy_speed_per_level,
    }
}

fn spawn_supply(
    ctx: SpawnContext,
    tuning: &Tuning,
    ids: &mut EntityIds,
    rng: &mut impl Rng,
) -> Supply {
    let effect = if rng.random::<f64>() < tuning.score_bonus_chance {
        SupplyEffect::ScoreBonus {
            points: tuning.score_bonus_points,
        }
    } else {
        SupplyEffect::WeaponUpgrade {
            weapon: weapon_for_roll(ctx.level, rng.random::<f32>()),
        }
    };

    let size = tuning.supply_size;
    let x = rng.random::<f32>() * placement_span(ctx.field_width, size.x);
    Supply {
        id: ids.next(),
        pos: Vec2::new(x, -size.y),
        size,
        effect,
    }
}
