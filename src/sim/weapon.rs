//! Weapon system
//!
//! Five fixed weapon variants, each with a fire interval and a barrel
//! formation. Firing is edge-triggered against accumulated play time, so the
//! shot cadence doesn't depend on the frame rate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{EntityIds, Player, Projectile};

/// Weapon variants, lowest tier first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    #[default]
    Basic,
    Double,
    Triple,
    Rapid,
    Powerful,
}

/// One projectile emitted per shot, placed relative to the player's top-left
#[derive(Debug, Clone, Copy)]
pub struct Barrel {
    /// Horizontal anchor as a fraction of the player's width
    pub anchor: f32,
    /// Offset added after anchoring
    pub offset: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub power: i32,
}

const fn barrel(anchor: f32, dx: f32, dy: f32, w: f32, h: f32, speed: f32, power: i32) -> Barrel {
    Barrel {
        anchor,
        offset: Vec2::new(dx, dy),
        size: Vec2::new(w, h),
        speed,
        power,
    }
}

const BASIC: [Barrel; 1] = [barrel(0.5, -5.0, -10.0, 10.0, 15.0, 8.0, 1)];
const DOUBLE: [Barrel; 2] = [
    barrel(0.25, -5.0, -10.0, 8.0, 12.0, 8.0, 1),
    barrel(0.75, -5.0, -10.0, 8.0, 12.0, 8.0, 1),
];
// Center shot leads, wing shots sit slightly lower
const TRIPLE: [Barrel; 3] = [
    barrel(0.5, -5.0, -10.0, 10.0, 15.0, 9.0, 1),
    barrel(0.25, -5.0, -5.0, 8.0, 12.0, 8.0, 1),
    barrel(0.75, -5.0, -5.0, 8.0, 12.0, 8.0, 1),
];
const RAPID: [Barrel; 1] = [barrel(0.5, -4.0, -10.0, 8.0, 14.0, 12.0, 1)];
const POWERFUL: [Barrel; 1] = [barrel(0.5, -7.0, -10.0, 14.0, 18.0, 7.0, 3)];

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::Basic,
        WeaponKind::Double,
        WeaponKind::Triple,
        WeaponKind::Rapid,
        WeaponKind::Powerful,
    ];

    /// Minimum play time between shots (ms)
    pub fn fire_interval_ms(self) -> f64 {
        match self {
            WeaponKind::Rapid => 200.0,
            WeaponKind::Powerful => 800.0,
            WeaponKind::Basic | WeaponKind::Double | WeaponKind::Triple => 500.0,
        }
    }

    pub fn barrels(self) -> &'static [Barrel] {
        match self {
            WeaponKind::Basic => &BASIC,
            WeaponKind::Double => &DOUBLE,
            WeaponKind::Triple => &TRIPLE,
            WeaponKind::Rapid => &RAPID,
            WeaponKind::Powerful => &POWERFUL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Basic => "Basic",
            WeaponKind::Double => "Double",
            WeaponKind::Triple => "Triple",
            WeaponKind::Rapid => "Rapid",
            WeaponKind::Powerful => "Powerful",
        }
    }
}

/// True once per fire interval: when this tick's play time has just crossed
/// a multiple of the interval.
#[inline]
pub fn ready_to_fire(weapon: WeaponKind, elapsed_ms: f64, dt_ms: f64) -> bool {
    elapsed_ms % weapon.fire_interval_ms() < dt_ms
}

/// Create the projectiles for one shot of the player's current weapon
pub fn fire(player: &Player, ids: &mut EntityIds) -> Vec<Projectile> {
    player
        .weapon
        .barrels()
        .iter()
        .map(|b| Projectile {
            id: ids.next(),
            pos: player.pos + Vec2::new(player.size.x * b.anchor, 0.0) + b.offset,
            size: b.size,
            speed: b.speed,
            power: b.power,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with(weapon: WeaponKind) -> Player {
        Player {
            pos: Vec2::new(100.0, 600.0),
            size: Vec2::new(40.0, 40.0),
            weapon,
        }
    }

    #[test]
    fn test_projectile_counts() {
        let mut ids = EntityIds::default();
        let counts: Vec<usize> = WeaponKind::ALL
            .iter()
            .map(|&w| fire(&player_with(w), &mut ids).len())
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 1, 1]);
    }

    #[test]
    fn test_multi_shot_ids_are_unique() {
        let mut ids = EntityIds::default();
        let shots = fire(&player_with(WeaponKind::Triple), &mut ids);
        assert_ne!(shots[0].id, shots[1].id);
        assert_ne!(shots[1].id, shots[2].id);
        assert_ne!(shots[0].id, shots[2].id);
    }

    #[test]
    fn test_triple_formation() {
        let mut ids = EntityIds::default();
        let shots = fire(&player_with(WeaponKind::Triple), &mut ids);
        // Center: x + 20 - 5, y - 10
        assert_eq!(shots[0].pos, Vec2::new(115.0, 590.0));
        assert_eq!(shots[0].speed, 9.0);
        // Wings: x + 10 - 5 and x + 30 - 5, y - 5
        assert_eq!(shots[1].pos, Vec2::new(105.0, 595.0));
        assert_eq!(shots[2].pos, Vec2::new(125.0, 595.0));
        assert!(shots.iter().all(|s| s.power == 1));
    }

    #[test]
    fn test_powerful_is_slow_and_strong() {
        let mut ids = EntityIds::default();
        let shots = fire(&player_with(WeaponKind::Powerful), &mut ids);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].power, 3);
        assert!(WeaponKind::ALL.iter().all(|w| w.fire_interval_ms() <= 800.0));
        assert!(WeaponKind::ALL.iter().all(|w| w.fire_interval_ms() >= 200.0));
    }

    #[test]
    fn test_rapid_cadence_over_one_second() {
        let dt = 16.6;
        let mut elapsed = 0.0;
        let mut shots = 0;
        let mut ids = EntityIds::default();
        let player = player_with(WeaponKind::Rapid);
        while elapsed < 1000.0 {
            elapsed += dt;
            if ready_to_fire(player.weapon, elapsed, dt) {
                let fired = fire(&player, &mut ids);
                assert_eq!(fired.len(), 1);
                shots += 1;
            }
        }
        assert!((4..=6).contains(&shots), "fired {shots} times");
    }

    #[test]
    fn test_cadence_independent_of_frame_rate() {
        let count = |dt: f64| {
            let mut elapsed = 0.0;
            let mut n = 0;
            while elapsed < 5000.0 {
                elapsed += dt;
                if ready_to_fire(WeaponKind::Basic, elapsed, dt) {
                    n += 1;
                }
            }
            n
        };
        let slow = count(33.3);
        let fast = count(8.3);
        assert!((slow as i32 - fast as i32).abs() <= 1, "{slow} vs {fast}");
    }

    #[test]
    fn test_zero_dt_never_fires() {
        assert!(!ready_to_fire(WeaponKind::Basic, 1000.0, 0.0));
    }
}
