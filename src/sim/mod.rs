//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Capped timestep, supplied by the caller
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids never reused)
//! - No rendering, audio or input-device dependencies

pub mod body;
pub mod boss;
pub mod collision;
pub mod enemy;
pub mod level;
pub mod platform;
pub mod player;
pub mod powerup;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use body::{Body, PlatformContact};
pub use boss::{Boss, BossAttack, phase_for};
pub use collision::{Aabb, Contact, box_contact};
pub use enemy::{Enemy, EnemyKind, Foe};
pub use level::{LevelLayout, LevelSet, Theme};
pub use platform::{Platform, PlatformBehavior, PlatformKind};
pub use player::{MoveIntent, Player, TimedPower};
pub use powerup::{PowerKind, PowerUp};
pub use projectile::{Projectile, ProjectileKind, TargetRef, within_blast};
pub use snapshot::RenderSnapshot;
pub use state::{EntityIds, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
