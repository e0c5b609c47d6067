//! Per-tick game events
//!
//! Raised by `tick` for hosts that want feedback (sound, haptics, analytics).
//! The simulation never reads them back.

use glam::Vec2;
use serde::Serialize;

use super::weapon::WeaponKind;

/// Something notable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Shot {
        weapon: WeaponKind,
        projectiles: u32,
    },
    EnemyHit { enemy_id: u32, pos: Vec2 },
    EnemyDestroyed { enemy_id: u32, pos: Vec2 },
    ScoreBonusCollected { points: u64 },
    WeaponEquipped { weapon: WeaponKind },
    LevelUp { level: u32 },
    TokenAwarded { tokens: u64 },
    PlayerDestroyed { pos: Vec2 },
}

/// Sound a host may play for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Shoot,
    Explosion,
    LevelUp,
    Token,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::Explosion => "explosion",
            SoundCue::LevelUp => "level_up",
            SoundCue::Token => "token",
        }
    }
}

impl GameEvent {
    pub fn sound_cue(&self) -> Option<SoundCue> {
        match self {
            GameEvent::Shot { .. } => Some(SoundCue::Shoot),
            GameEvent::EnemyHit { .. }
            | GameEvent::EnemyDestroyed { .. }
            | GameEvent::PlayerDestroyed { .. } => Some(SoundCue::Explosion),
            GameEvent::LevelUp { .. } => Some(SoundCue::LevelUp),
            GameEvent::TokenAwarded { .. } => Some(SoundCue::Token),
            GameEvent::ScoreBonusCollected { .. } | GameEvent::WeaponEquipped { .. } => None,
        }
    }
}
