//! Collision resolution
//!
//! Runs once per unpaused tick after movement and culling. Order matters and
//! is fixed:
//! 1. projectiles vs enemies (newest projectile first, newest enemy first)
//! 2. player vs enemies (ends the session, skips step 3)
//! 3. player vs supplies
//!
//! The resolver edits the entity collections in place and reports everything
//! else (score, blasts, equip, game over) for the tick to apply.

use glam::Vec2;

use super::state::{Enemy, Player, Projectile, Supply, SupplyEffect};
use super::weapon::WeaponKind;
use crate::tuning::Tuning;

/// A blast to spawn, centered at `pos`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub pos: Vec2,
    pub size: f32,
}

/// Everything the resolver decided this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Points earned from kills and score bonuses
    pub score_gained: u64,
    /// Blasts in the order they happened
    pub blasts: Vec<Blast>,
    /// Enemies damaged but not destroyed
    pub hits: Vec<(u32, Vec2)>,
    /// Enemies destroyed
    pub kills: Vec<(u32, Vec2)>,
    /// Score bonuses collected
    pub bonuses: Vec<u64>,
    /// Last weapon picked up this tick, if any
    pub equipped: Option<WeaponKind>,
    /// Player touched an enemy
    pub game_over: bool,
}

/// Resolve all overlaps for one tick
pub fn resolve(
    player: &Player,
    enemies: &mut Vec<Enemy>,
    projectiles: &mut Vec<Projectile>,
    supplies: &mut Vec<Supply>,
    tuning: &Tuning,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    resolve_projectiles(enemies, projectiles, tuning, &mut report);

    let player_box = player.bounds().inset(tuning.player_inset);
    if enemies
        .iter()
        .any(|e| player_box.overlaps(&e.bounds().inset(tuning.enemy_inset)))
    {
        report.blasts.push(Blast {
            pos: player.center(),
            size: tuning.player_explosion_size,
        });
        report.game_over = true;
        return report;
    }

    supplies.retain(|supply| {
        if !player_box.overlaps(&supply.bounds().inset(tuning.supply_inset)) {
            return true;
        }
        match supply.effect {
            SupplyEffect::ScoreBonus { points } => {
                report.score_gained += points;
                report.bonuses.push(points);
            }
            SupplyEffect::WeaponUpgrade { weapon } => report.equipped = Some(weapon),
        }
        false
    });

    report
}

/// Each projectile damages at most one enemy, then disappears
fn resolve_projectiles(
    enemies: &mut Vec<Enemy>,
    projectiles: &mut Vec<Projectile>,
    tuning: &Tuning,
    report: &mut CollisionReport,
) {
    for pi in (0..projectiles.len()).rev() {
        let shot_box = projectiles[pi].bounds().inset(tuning.projectile_inset);

        let Some(ei) = (0..enemies.len())
            .rev()
            .find(|&ei| shot_box.overlaps(&enemies[ei].bounds().inset(tuning.enemy_inset)))
        else {
            continue;
        };

        let shot = projectiles.remove(pi);
        report.blasts.push(Blast {
            pos: shot.center(),
            size: shot.power as f32 * tuning.impact_explosion_per_power
                + tuning.impact_explosion_base,
        });

        let enemy = &mut enemies[ei];
        enemy.health -= shot.power;
        if enemy.health <= 0 {
            let dead = enemies.remove(ei);
            report.blasts.push(Blast {
                pos: dead.center(),
                size: tuning.enemy_explosion_size,
            });
            report.kills.push((dead.id, dead.center()));
            report.score_gained += tuning.kill_score;
        } else {
            report.hits.push((enemy.id, enemy.center()));
        }
    }
}
