//! Fracture Realms - simulation core for a gravity-flipping arena platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, combat, modifiers, bosses)
//! - `driver`: Frame driver with clamped delta-time and pause gate
//! - `settings`: Realm configuration loaded at realm start
//! - `upgrades`: Shard-funded upgrade shop

pub mod driver;
pub mod settings;
pub mod sim;
pub mod upgrades;

pub use driver::{DriverState, FrameDriver, FrameHost};
pub use settings::{ConfigError, GameConfig, WorldConfig};
pub use upgrades::{PurchaseError, UpgradeFlags, UpgradeId, UpgradeShop};

/// Game configuration constants
pub mod consts {
    /// Hard cap on a single frame delta (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Default arena dimensions
    pub const DEFAULT_ARENA_WIDTH: f32 = 1280.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 720.0;
    /// Horizontal margin entities are clamped to
    pub const ARENA_SIDE_MARGIN: f32 = 20.0;
    /// Distance beyond the arena at which entities count as lost to the void
    pub const VOID_MARGIN: f32 = 300.0;
    /// Damage taken by a player lost to the void
    pub const VOID_DAMAGE: f32 = 25.0;
    /// Y coordinate players respawn at after a void fall
    pub const VOID_RESPAWN_Y: f32 = 100.0;

    /// Base gravity acceleration (pixels/s²)
    pub const GRAVITY: f32 = 1000.0;
    /// Default gravity flip period (seconds)
    pub const GRAV_FLIP_EVERY: f32 = 30.0;
    /// Default time pulse period (seconds)
    pub const TIME_PULSE_EVERY: f32 = 12.0;
    /// Scheduled time pulse target range
    pub const TIME_PULSE_MIN: f32 = 0.7;
    pub const TIME_PULSE_MAX: f32 = 1.3;
    /// Time pulse ease-in, hold and ease-out durations (seconds)
    pub const PULSE_EASE_IN: f32 = 1.2;
    pub const PULSE_HOLD: f32 = 0.8;
    pub const PULSE_EASE_OUT: f32 = 0.8;
    /// No pulses this long after realm entry / boss spawn
    pub const PULSE_GRACE_ON_ENTRY: f32 = 4.0;
    pub const PULSE_GRACE_ON_BOSS: f32 = 3.0;
    /// Hazard plane speed (pixels/s) and enrage multiplier
    pub const HAZARD_RISE_SPEED: f32 = 12.0;
    pub const HAZARD_ENRAGE_MULT: f32 = 1.6;
    /// Hazard plane start offset below the arena
    pub const HAZARD_START_OFFSET: f32 = 160.0;

    /// Player movement tuning
    pub const PLAYER_WIDTH: f32 = 48.0;
    pub const PLAYER_HEIGHT: f32 = 64.0;
    pub const PLAYER_MAX_HP: f32 = 100.0;
    pub const MOVE_ACCEL: f32 = 1800.0;
    pub const MAX_RUN_SPEED: f32 = 280.0;
    pub const AIR_CONTROL: f32 = 0.75;
    pub const GROUND_FRICTION: f32 = 1400.0;
    pub const AIR_FRICTION: f32 = 500.0;
    pub const JUMP_VELOCITY: f32 = 450.0;
    pub const MAX_JUMPS: u8 = 2;
    /// Co-op partner spawns this far right of player one
    pub const COOP_SPAWN_OFFSET: f32 = 40.0;

    /// Dash
    pub const DASH_IMPULSE: f32 = 600.0;
    pub const DASH_COOLDOWN: f32 = 0.8;

    /// Grapple pull (pixels/s²) and release distance
    pub const GRAPPLE_PULL: f32 = 720.0;
    pub const GRAPPLE_PULL_BOOSTED: f32 = 960.0;
    pub const GRAPPLE_RELEASE_DIST: f32 = 30.0;

    /// Melee
    pub const MELEE_REACH: f32 = 48.0;
    pub const MELEE_INSET: f32 = 10.0;
    pub const MELEE_BOSS_DAMAGE: f32 = 14.0;
    pub const MELEE_COMBO_WINDOW: f32 = 2.5;

    /// Magic
    pub const MAGIC_SPEED: f32 = 540.0;
    pub const MAGIC_SPREAD: f32 = 0.06;
    pub const MAGIC_LIFE: f32 = 1.2;
    pub const MAGIC_DAMAGE: f32 = 10.0;
    pub const MAGIC_BOSS_DAMAGE: f32 = 8.0;
    pub const MAGIC_COMBO_WINDOW: f32 = 2.0;
    /// Projectiles sag under this fraction of gravity
    pub const BULLET_GRAVITY_FACTOR: f32 = 0.12;
    pub const BULLET_HALF_SIZE: f32 = 6.0;
    /// Ricochet only arms in the tail end of a projectile's life
    pub const RICOCHET_ARM_LIFE: f32 = 0.7;

    /// Damage multiplier while a block timer is active
    pub const BLOCK_MULTIPLIER: f32 = 0.25;
    pub const BLOCK_DURATION: f32 = 1.5;
    /// Combo above which enemies start blocking
    pub const RETALIATION_COMBO: u32 = 4;
    pub const MAX_COMBO: u32 = 999;

    /// Contact damage
    pub const CONTACT_IFRAMES: f32 = 0.6;
    pub const CONTACT_KNOCKBACK: f32 = 220.0;

    /// Waves
    pub const INITIAL_WAVE: usize = 4;
    pub const MIN_ENEMIES: usize = 4;

    /// Shards
    pub const SHARD_GRAVITY: f32 = 700.0;
    pub const SHARD_LIFE: f32 = 8.0;
    pub const SHARD_HALF_SIZE: f32 = 8.0;
    pub const BOSS_SHARD_DROP: usize = 20;

    /// Boss arrival delay after realm entry (seconds)
    pub const BOSS_SPAWN_DELAY: f32 = 4.0;

    /// Epsilon distance used when normalizing near-zero vectors
    pub const DIR_EPSILON: f32 = 1e-3;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign of `v` as -1, 0 or 1 (zero stays zero, unlike `f32::signum`)
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Cosine ease-in-out on `t` in [0, 1]
#[inline]
pub fn ease_cosine(t: f32) -> f32 {
    if t >= 1.0 {
        1.0
    } else if t <= 0.0 {
        0.0
    } else {
        (1.0 - (std::f32::consts::PI * t).cos()) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_keeps_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(0.5), 1.0);
    }

    #[test]
    fn test_ease_cosine_endpoints() {
        assert_eq!(ease_cosine(0.0), 0.0);
        assert_eq!(ease_cosine(1.0), 1.0);
        assert!((ease_cosine(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(ease_cosine(2.0), 1.0);
    }
}
