//! Read-only view of the game for presentation
//!
//! Taken after a tick completes; the page renders from this and never touches
//! `GameState` directly.

use serde::Serialize;

use super::state::{Enemy, Explosion, GameState, GameSummary, Player, Projectile, Supply};
use super::weapon::WeaponKind;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub supplies: Vec<Supply>,
    pub explosions: Vec<ExplosionView>,
    pub score: u64,
    pub tokens: u64,
    pub level: u32,
    pub difficulty: f32,
    pub weapon: WeaponKind,
    pub paused: bool,
    pub level_up: bool,
    pub elapsed_ms: f64,
    /// Present on the frame the player was destroyed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameSummary>,
}

/// An explosion plus how far along its fade it is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosionView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// 0 at creation, 1 at expiry
    pub progress: f32,
}

impl From<&Explosion> for ExplosionView {
    fn from(e: &Explosion) -> Self {
        Self {
            id: e.id,
            x: e.pos.x,
            y: e.pos.y,
            size: e.size,
            progress: e.progress(),
        }
    }
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            player: state.player.clone(),
            enemies: state.enemies.clone(),
            projectiles: state.projectiles.clone(),
            supplies: state.supplies.clone(),
            explosions: state.explosions.iter().map(ExplosionView::from).collect(),
            score: state.score,
            tokens: state.tokens(),
            level: state.level(),
            difficulty: state.progression.difficulty(),
            weapon: state.player.weapon,
            paused: state.paused,
            level_up: state.progression.level_up_active(),
            elapsed_ms: state.elapsed_ms,
            outcome: state.outcome,
        }
    }

    pub fn to_json(&self) -> String {
        // Only plain numbers, strings and bools: serialization can't fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec2;

    #[test]
    fn test_capture_reflects_state() {
        let mut state = GameState::new(5, Vec2::new(400.0, 700.0), Tuning::default());
        state.spawn_explosion(Vec2::new(50.0, 60.0), 40.0);
        state.score = 42;
        let snap = Snapshot::capture(&state);

        assert_eq!(snap.score, 42);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.tokens, 0);
        assert_eq!(snap.weapon, WeaponKind::Basic);
        assert_eq!(snap.explosions.len(), 1);
        assert_eq!(snap.explosions[0].x, 50.0);
        assert!(!snap.paused);
        assert!(!snap.level_up);
    }

    #[test]
    fn test_json_shape() {
        let state = GameState::new(5, Vec2::new(400.0, 700.0), Tuning::default());
        let json: serde_json::Value =
            serde_json::from_str(&Snapshot::capture(&state).to_json()).unwrap();
        assert_eq!(json["weapon"], "basic");
        assert_eq!(json["player"]["pos"][0], 180.0);
        assert!(json["enemies"].as_array().unwrap().is_empty());
        assert!(json.get("outcome").is_none());
    }
}
