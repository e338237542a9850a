//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (one `Pcg32` in `GameState`)
//! - Stable iteration order (slot order in every pool)
//! - Global modifiers change only at tick boundaries
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod boss;
pub mod collision;
pub mod combat;
pub mod entity;
pub mod events;
pub mod input;
pub mod modifiers;
pub mod platform;
pub mod pool;
pub mod rect;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod tween;

pub use autopilot::Autopilot;
pub use boss::{Boss, BossKind};
pub use collision::{BodyKind, Resolution, resolve};
pub use entity::{Body, Bullet, BulletOwner, Enemy, EnemyKind, Player, Shard, Style};
pub use events::{EventSink, GameEvent, HitSource, LogSink, Target};
pub use input::{PlayerInput, TickInput};
pub use modifiers::{ModifierConfig, WorldModifiers};
pub use platform::Platform;
pub use pool::Pool;
pub use rect::Rect;
pub use snapshot::Snapshot;
pub use state::{Arena, GameState, REALM_NAMES, RealmPhase};
pub use tick::tick;
