//! Decaying platforms
//!
//! Platforms accumulate standing time while a player occupies them and break
//! once it exceeds their (randomized) threshold. Some platforms drift sideways.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Break threshold base (ms of continuous standing)
pub const BREAK_BASE_MS: f32 = 2400.0;
/// Break threshold base under assist mode
pub const BREAK_BASE_ASSIST_MS: f32 = 4200.0;
/// Random spread added on top of the base threshold
pub const BREAK_SPREAD_MS: f32 = 1500.0;
/// Standing time gained per second occupied
pub const STAND_GAIN_PER_SEC: f32 = 1000.0;
/// Standing time recovered per second unoccupied
pub const STAND_RECOVER_PER_SEC: f32 = 500.0;
/// Chance a generated platform oscillates
pub const MOVING_CHANCE: f64 = 0.25;
/// Oscillation speed amplitude (pixels/s) and angular rate (rad/s)
pub const OSCILLATION_AMPLITUDE: f32 = 20.0;
pub const OSCILLATION_RATE: f32 = 0.5;

/// Horizontal oscillation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub phase: f32,
    pub amplitude: f32,
}

/// A breakable surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    /// Accumulated standing time (ms)
    pub standing_time: f32,
    /// Standing time at which the platform breaks (ms)
    pub break_threshold: f32,
    pub dead: bool,
    /// Set by collision when a player lands; consumed by the next `update`
    #[serde(skip)]
    pub occupied: bool,
    /// Current horizontal drift velocity
    pub vx: f32,
    pub oscillation: Option<Oscillation>,
}

impl Platform {
    /// Static platform with an explicit break threshold
    pub fn new(x: f32, y: f32, w: f32, h: f32, break_threshold: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            standing_time: 0.0,
            break_threshold,
            dead: false,
            occupied: false,
            vx: 0.0,
            oscillation: None,
        }
    }

    /// Randomized platform as built for an arena
    pub fn generate<R: Rng>(rng: &mut R, x: f32, y: f32, w: f32, h: f32, assist: bool) -> Self {
        let base = if assist {
            BREAK_BASE_ASSIST_MS
        } else {
            BREAK_BASE_MS
        };
        let threshold = base + rng.random::<f32>() * BREAK_SPREAD_MS;
        let mut platform = Self::new(x, y, w, h, threshold);
        let phase = rng.random::<f32>() * std::f32::consts::TAU;
        if rng.random_bool(MOVING_CHANCE) {
            platform.oscillation = Some(Oscillation {
                phase,
                amplitude: OSCILLATION_AMPLITUDE,
            });
        }
        platform
    }

    /// Advance decay and drift. `time` is the gameplay clock in seconds.
    pub fn update(&mut self, dt: f32, time: f32) {
        if self.dead {
            return;
        }
        if self.occupied {
            self.standing_time += dt * STAND_GAIN_PER_SEC;
            if self.standing_time > self.break_threshold {
                self.dead = true;
            }
        } else {
            self.standing_time = (self.standing_time - dt * STAND_RECOVER_PER_SEC).max(0.0);
        }
        self.occupied = false;

        if let Some(osc) = self.oscillation {
            self.vx = (time * OSCILLATION_RATE + osc.phase).sin() * osc.amplitude;
            self.rect.x += self.vx * dt;
        }
    }

    /// Mark dead once the platform has drifted completely outside the arena
    pub fn cull_off_screen(&mut self, arena_width: f32) {
        if !self.dead && (self.rect.right() < 0.0 || self.rect.left() > arena_width) {
            self.dead = true;
        }
    }

    /// Decay progress in [0, 1] for presentation
    pub fn wear(&self) -> f32 {
        if self.break_threshold <= 0.0 {
            return 1.0;
        }
        (self.standing_time / self.break_threshold).clamp(0.0, 1.0)
    }

    /// Rect for collision, `None` once the platform is dead
    #[inline]
    pub fn solid_rect(&self) -> Option<Rect> {
        if self.dead { None } else { Some(self.rect) }
    }
}
