//! Simulation module
//!
//! All gameplay logic lives here. Nothing in `sim` touches the DOM:
//! - Frame-driven: every threshold is compared against accumulated time
//! - Seeded RNG only
//! - Stable iteration order (creation order within each collection)
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod hitbox;
pub mod progression;
pub mod session;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapon;

pub use collision::{Blast, CollisionReport};
pub use events::{GameEvent, SoundCue};
pub use hitbox::Rect;
pub use progression::{Progression, ProgressionUpdate, level_for_score, tokens_for_score};
pub use session::{Session, SessionPhase};
pub use snapshot::{ExplosionView, Snapshot};
pub use spawner::{SpawnBatch, SpawnContext, Spawner};
pub use state::{
    Enemy, EntityIds, Explosion, GameState, GameSummary, Player, Projectile, Supply, SupplyEffect,
};
pub use tick::{TickInput, tick};
pub use weapon::WeaponKind;
