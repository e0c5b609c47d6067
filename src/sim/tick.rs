//! Frame-driven simulation tick
//!
//! Advances the game by one animation frame of `dt` milliseconds. Every time
//! threshold (fire rate, spawn interval, banner duration) is compared against
//! accumulated time, and speeds are scaled by `dt`, so a session plays the
//! same at 30, 60 or 144 Hz.

use super::collision::{self, CollisionReport};
use super::events::GameEvent;
use super::spawner::SpawnContext;
use super::state::{GameState, GameSummary};
use super::weapon;
use crate::consts::REFERENCE_FRAME_MS;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired left edge of the player (pointer x minus half the ship)
    pub target_x: Option<f32>,
    /// Pointer held: keep shooting
    pub firing: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f64) {
    state.events.clear();

    if state.is_over() {
        return;
    }

    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    if input.pause {
        state.paused = !state.paused;
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }

    // Banner and blasts keep running while paused
    state.progression.decay(dt);
    state.age_explosions(dt);

    if state.paused {
        return;
    }

    // (a) Player follows the pointer
    if let Some(target_x) = input.target_x {
        state.player.pos.x = crate::clamp_to_field(target_x, state.field.x, state.player.size.x);
    }

    // (b) Play time
    state.elapsed_ms += dt;

    // (c) Fire
    if input.firing && weapon::ready_to_fire(state.player.weapon, state.elapsed_ms, dt) {
        let shots = weapon::fire(&state.player, &mut state.ids);
        state.events.push(GameEvent::Shot {
            weapon: state.player.weapon,
            projectiles: shots.len() as u32,
        });
        state.projectiles.extend(shots);
    }

    // (d) Spawn
    let ctx = SpawnContext {
        dt_ms: dt,
        level: state.progression.level(),
        difficulty: state.progression.difficulty(),
        field_width: state.field.x,
    };
    let batch = state
        .spawner
        .advance(ctx, &state.tuning, &mut state.ids, &mut state.rng);
    if let Some(enemy) = batch.enemy {
        log::debug!("Enemy {} spawned (hp {}, speed {:.1})", enemy.id, enemy.health, enemy.speed);
        state.enemies.push(enemy);
    }
    if let Some(supply) = batch.supply {
        log::debug!("Supply {} spawned: {:?}", supply.id, supply.effect);
        state.supplies.push(supply);
    }

    // (e) Move, then cull whatever left the field
    advance_entities(state, dt);

    // (f) Collisions
    let report = collision::resolve(
        &state.player,
        &mut state.enemies,
        &mut state.projectiles,
        &mut state.supplies,
        &state.tuning,
    );
    apply_report(state, report);

    // (g) Progression
    observe_progression(state);
}

/// Move every entity by its speed, scaled to this frame's length
fn advance_entities(state: &mut GameState, dt: f64) {
    let frames = (dt / REFERENCE_FRAME_MS) as f32;
    let field_height = state.field.y;

    for enemy in &mut state.enemies {
        enemy.pos.y += enemy.speed * frames;
    }
    state.enemies.retain(|e| e.pos.y < field_height);

    let supply_speed = state.tuning.supply_fall_speed;
    for supply in &mut state.supplies {
        supply.pos.y += supply_speed * frames;
    }
    state.supplies.retain(|s| s.pos.y < field_height);

    for projectile in &mut state.projectiles {
        projectile.pos.y -= projectile.speed * frames;
    }
    state.projectiles.retain(|p| p.pos.y + p.size.y > 0.0);
}

fn apply_report(state: &mut GameState, report: CollisionReport) {
    for blast in &report.blasts {
        state.spawn_explosion(blast.pos, blast.size);
    }
    for &(enemy_id, pos) in &report.hits {
        state.events.push(GameEvent::EnemyHit { enemy_id, pos });
    }
    for &(enemy_id, pos) in &report.kills {
        state.events.push(GameEvent::EnemyDestroyed { enemy_id, pos });
    }
    for &points in &report.bonuses {
        state.events.push(GameEvent::ScoreBonusCollected { points });
    }

    state.score += report.score_gained;

    if report.game_over {
        let pos = state.player.center();
        state.events.push(GameEvent::PlayerDestroyed { pos });
        observe_progression(state);
        let summary = GameSummary {
            score: state.score,
            tokens: state.tokens(),
            level: state.level(),
        };
        log::info!(
            "Game over: score {}, tokens {}, level {}",
            summary.score,
            summary.tokens,
            summary.level
        );
        state.outcome = Some(summary);
        return;
    }

    if let Some(weapon) = report.equipped {
        log::info!("Equipped {} weapon", weapon.as_str());
        state.player.weapon = weapon;
        state.events.push(GameEvent::WeaponEquipped { weapon });
    }
}

fn observe_progression(state: &mut GameState) {
    let update = state.progression.observe_score(state.score);
    if let Some(level) = update.level_up {
        state.events.push(GameEvent::LevelUp { level });
    }
    if let Some(tokens) = update.tokens {
        state.events.push(GameEvent::TokenAwarded { tokens });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, Projectile, Supply, SupplyEffect};
    use crate::sim::weapon::WeaponKind;
    use crate::tuning::Tuning;
    use glam::Vec2;

    const DT: f64 = 1000.0 / 60.0;

    fn quiet_tuning() -> Tuning {
        // No random arrivals unless a test wants them
        Tuning {
            enemy_base_spawn_interval_ms: 1.0e12,
            enemy_min_spawn_interval_ms: 1.0e12,
            supply_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn new_state() -> GameState {
        GameState::new(12345, Vec2::new(400.0, 700.0), quiet_tuning())
    }

    #[test]
    fn test_player_follows_pointer_clamped() {
        let mut state = new_state();
        let input = TickInput {
            target_x: Some(500.0),
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.player.pos.x, 360.0);

        let input = TickInput {
            target_x: Some(-20.0),
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.player.pos.x, 0.0);
    }

    #[test]
    fn test_pause_freezes_play_but_not_banner() {
        let mut state = new_state();
        tick(&mut state, &TickInput::default(), DT);
        let elapsed = state.elapsed_ms;

        state.score = 1000;
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.progression.level_up_active());

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert!(state.paused);
        let frozen = state.elapsed_ms;

        let busy = TickInput {
            target_x: Some(0.0),
            firing: true,
            pause: false,
        };
        for _ in 0..200 {
            tick(&mut state, &busy, DT);
        }
        assert_eq!(state.elapsed_ms, frozen);
        assert!(state.projectiles.is_empty());
        assert!(frozen > elapsed);
        // 200 frames > 2000 ms: the banner has cleared despite the pause
        assert!(!state.progression.level_up_active());

        tick(&mut state, &pause, DT);
        assert!(!state.paused);
    }

    #[test]
    fn test_holding_fire_shoots_on_interval() {
        let mut state = new_state();
        let input = TickInput {
            firing: true,
            ..Default::default()
        };
        let mut shots = 0;
        // Projectiles leave the field after ~80 frames, so count events
        for _ in 0..120 {
            tick(&mut state, &input, DT);
            shots += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::Shot { .. }))
                .count();
        }
        // 2000 ms of basic fire at 500 ms
        assert!((3..=5).contains(&shots), "shots = {shots}");
    }

    #[test]
    fn test_upgrade_then_fire_triple() {
        let mut state = new_state();
        let id = state.next_entity_id();
        state.supplies.push(Supply {
            id,
            pos: state.player.pos + Vec2::new(10.0, 10.0),
            size: Vec2::new(20.0, 20.0),
            effect: SupplyEffect::WeaponUpgrade {
                weapon: WeaponKind::Triple,
            },
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player.weapon, WeaponKind::Triple);
        assert!(state.supplies.is_empty());

        let input = TickInput {
            firing: true,
            ..Default::default()
        };
        let mut fired = None;
        for _ in 0..60 {
            tick(&mut state, &input, DT);
            if let Some(GameEvent::Shot { weapon, projectiles }) = state
                .events
                .iter()
                .find(|e| matches!(e, GameEvent::Shot { .. }))
            {
                fired = Some((*weapon, *projectiles));
                break;
            }
        }
        assert_eq!(fired, Some((WeaponKind::Triple, 3)));
        assert_eq!(state.projectiles.len(), 3);
    }

    #[test]
    fn test_entities_leaving_field_are_culled() {
        let mut state = new_state();
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        state.enemies.push(Enemy {
            id: a,
            pos: Vec2::new(10.0, 699.0),
            size: Vec2::new(30.0, 30.0),
            health: 1,
            speed: 2.0,
        });
        state.projectiles.push(Projectile {
            id: b,
            pos: Vec2::new(300.0, -14.0),
            size: Vec2::new(10.0, 15.0),
            speed: 8.0,
            power: 1,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_culled_projectile_never_hits() {
        let mut state = new_state();
        let enemy_id = state.next_entity_id();
        let shot_id = state.next_entity_id();
        state.enemies.push(Enemy {
            id: enemy_id,
            pos: Vec2::new(100.0, -30.0),
            size: Vec2::new(30.0, 30.0),
            health: 1,
            speed: 0.0,
        });
        // Still overlapping the enemy after moving, but entirely above the field
        state.projectiles.push(Projectile {
            id: shot_id,
            pos: Vec2::new(110.0, -8.0),
            size: Vec2::new(10.0, 15.0),
            speed: 8.0,
            power: 1,
        });

        tick(&mut state, &TickInput::default(), DT);

        assert!(state.projectiles.is_empty());
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, enemy_id);
        assert_eq!(state.enemies[0].health, 1);
        assert_eq!(state.enemies[0].pos, Vec2::new(100.0, -30.0));
        assert_eq!(state.score, 0);
        assert!(state.explosions.is_empty());
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyHit { .. } | GameEvent::EnemyDestroyed { .. }))
        );
    }

    #[test]
    fn test_speed_scales_with_dt() {
        let mut state = new_state();
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos: Vec2::new(10.0, 0.0),
            size: Vec2::new(30.0, 30.0),
            health: 1,
            speed: 3.0,
        });
        tick(&mut state, &TickInput::default(), 2.0 * DT);
        assert!((state.enemies[0].pos.y - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_enemy_contact_ends_session() {
        let mut state = new_state();
        state.score = 1990;
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos: state.player.pos,
            size: Vec2::new(30.0, 30.0),
            health: 1,
            speed: 0.0,
        });
        tick(&mut state, &TickInput::default(), DT);

        let summary = state.outcome.expect("game over");
        assert_eq!(summary.score, 1990);
        assert_eq!(summary.tokens, 1);
        assert_eq!(summary.level, 2);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::PlayerDestroyed { .. })));
        assert!(state.explosions.iter().any(|e| e.size == 60.0));

        // A finished state no longer advances
        let elapsed = state.elapsed_ms;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.elapsed_ms, elapsed);
    }

    #[test]
    fn test_score_crossing_triggers_level_up_event() {
        let mut state = new_state();
        state.score = 995;
        let enemy_id = state.next_entity_id();
        let shot_id = state.next_entity_id();
        state.enemies.push(Enemy {
            id: enemy_id,
            pos: Vec2::new(100.0, 100.0),
            size: Vec2::new(30.0, 30.0),
            health: 1,
            speed: 0.0,
        });
        state.projectiles.push(Projectile {
            id: shot_id,
            pos: Vec2::new(110.0, 110.0),
            size: Vec2::new(10.0, 15.0),
            speed: 0.0,
            power: 1,
        });
        state.supplies.push(Supply {
            id: state.ids.next(),
            pos: state.player.pos + Vec2::new(10.0, 10.0),
            size: Vec2::new(20.0, 20.0),
            effect: SupplyEffect::ScoreBonus { points: 20 },
        });
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.score, 1020);
        assert_eq!(state.level(), 2);
        assert_eq!(state.tokens(), 1);
        assert_eq!(state.progression.difficulty(), 1.5);
        assert!(state.events.contains(&GameEvent::LevelUp { level: 2 }));
        assert!(state.events.contains(&GameEvent::TokenAwarded { tokens: 1 }));
    }

    #[test]
    fn test_variable_dt_is_tolerated() {
        let mut state = GameState::new(7, Vec2::new(400.0, 700.0), Tuning::default());
        let input = TickInput {
            target_x: Some(180.0),
            firing: true,
            ..Default::default()
        };
        for i in 0..600 {
            let dt = match i % 3 {
                0 => 8.3,
                1 => 16.7,
                _ => 33.3,
            };
            tick(&mut state, &input, dt);
            if state.is_over() {
                break;
            }
            for e in &state.enemies {
                assert!(e.health >= 1);
                assert!(e.pos.y < state.field.y);
            }
            for p in &state.projectiles {
                assert!(p.pos.y + p.size.y > 0.0);
            }
        }
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut state = new_state();
        tick(&mut state, &TickInput::default(), -50.0);
        assert_eq!(state.elapsed_ms, 0.0);
        tick(&mut state, &TickInput::default(), f64::NAN);
        assert_eq!(state.elapsed_ms, 0.0);
    }
}
