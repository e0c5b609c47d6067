//! Game state and core simulation types
//!
//! One authoritative `GameState` per session, mutated in place by `tick`.
//! Presentation only ever sees the `Snapshot` taken after a tick completes.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::hitbox::Rect;
use super::progression::Progression;
use super::spawner::Spawner;
use super::weapon::WeaponKind;
use crate::box_center;
use crate::tuning::Tuning;

/// Monotonic id source shared by every entity collection of a session.
///
/// Ids never repeat within a session, even for several projectiles created
/// by the same shot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    /// Allocate a new entity ID
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub weapon: WeaponKind,
}

impl Player {
    /// Centered horizontally, resting just above the bottom of the field
    pub fn spawn(field: Vec2, tuning: &Tuning) -> Self {
        let size = tuning.player_size;
        Self {
            pos: Vec2::new(
                crate::clamp_to_field(field.x / 2.0 - size.x / 2.0, field.x, size.x),
                (field.y - size.y - tuning.player_bottom_margin).max(0.0),
            ),
            size,
            weapon: WeaponKind::Basic,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }
}

/// A descending enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Remaining hit points (always >= 1 while the enemy is alive)
    pub health: i32,
    /// Downward speed per reference frame
    pub speed: f32,
}

impl Enemy {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }
}

/// A player shot travelling upward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Upward speed per reference frame
    pub speed: f32,
    /// Damage dealt on hit
    pub power: i32,
}

impl Projectile {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }
}

/// What a supply does when collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SupplyEffect {
    ScoreBonus { points: u64 },
    WeaponUpgrade { weapon: WeaponKind },
}

/// A falling pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub effect: SupplyEffect,
}

impl Supply {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// A short-lived visual blast. Expires on its own after `lifetime_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    /// Center of the blast
    pub pos: Vec2,
    pub size: f32,
    pub age_ms: f64,
    pub lifetime_ms: f64,
}

impl Explosion {
    /// 0 when created, 1 when about to expire
    pub fn progress(&self) -> f32 {
        (self.age_ms / self.lifetime_ms).clamp(0.0, 1.0) as f32
    }

    pub fn expired(&self) -> bool {
        self.age_ms >= self.lifetime_ms
    }
}

/// Final result of a session, handed to the host on game over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub score: u64,
    pub tokens: u64,
    pub level: u32,
}

impl GameSummary {
    /// Flavour line for the game-over screen, by level reached
    pub fn message(&self) -> &'static str {
        match self.level {
            0..=1 => "You barely started your escape...",
            2..=3 => "A good try, but the horde is relentless.",
            4..=5 => "Impressive! You almost got away.",
            _ => "Incredible! A true survivor.",
        }
    }
}

/// Complete state of one running session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the session's RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Play-field size
    pub field: Vec2,
    pub player: Player,
    /// Live entities, in creation order
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub supplies: Vec<Supply>,
    pub explosions: Vec<Explosion>,
    /// Cumulative score (never decreases)
    pub score: u64,
    pub progression: Progression,
    pub spawner: Spawner,
    /// Unpaused play time (ms)
    pub elapsed_ms: f64,
    pub paused: bool,
    /// Set once the player is destroyed; the state no longer ticks
    pub outcome: Option<GameSummary>,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
    pub(crate) ids: EntityIds,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, field: Vec2, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::spawn(field, &tuning),
            progression: Progression::new(&tuning),
            tuning,
            field,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            supplies: Vec::new(),
            explosions: Vec::new(),
            score: 0,
            spawner: Spawner::default(),
            elapsed_ms: 0.0,
            paused: false,
            outcome: None,
            events: Vec::new(),
            ids: EntityIds::default(),
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next()
    }

    pub fn level(&self) -> u32 {
        self.progression.level()
    }

    pub fn tokens(&self) -> u64 {
        self.progression.tokens()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Start a blast centered at `pos`
    pub fn spawn_explosion(&mut self, pos: Vec2, size: f32) {
        let id = self.ids.next();
        self.explosions.push(Explosion {
            id,
            pos,
            size,
            age_ms: 0.0,
            lifetime_ms: self.tuning.explosion_lifetime_ms,
        });
    }

    /// Remove an explosion by id. Removing one that is already gone is a no-op.
    pub fn remove_explosion(&mut self, id: u32) -> bool {
        let before = self.explosions.len();
        self.explosions.retain(|e| e.id != id);
        self.explosions.len() != before
    }

    /// Age every explosion and drop the expired ones
    pub fn age_explosions(&mut self, dt_ms: f64) {
        for explosion in &mut self.explosions {
            explosion.age_ms += dt_ms;
        }
        self.explosions.retain(|e| !e.expired());
    }

    /// Drop every pending explosion (session teardown)
    pub fn cancel_explosions(&mut self) {
        self.explosions.clear();
    }

    /// Adopt a new play-field size (container resized). Keeps the player inside.
    pub fn resize(&mut self, field: Vec2) {
        self.field = field;
        self.player.pos.x = crate::clamp_to_field(self.player.pos.x, field.x, self.player.size.x);
        self.player.pos.y =
            (field.y - self.player.size.y - self.tuning.player_bottom_margin).max(0.0);
    }
}
