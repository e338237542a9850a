//! Tick-driven easing
//!
//! Animations are plain values advanced once per tick rather than callbacks
//! that reschedule themselves. Starting a new animation on a channel replaces
//! the old one.

use serde::{Deserialize, Serialize};

use crate::{ease_cosine, lerp};

/// Cosine-eased interpolation between two values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Normalized progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn value(&self) -> f32 {
        lerp(self.from, self.to, ease_cosine(self.progress()))
    }

    pub fn finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance and return the new value
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.value()
    }
}

/// Stage of a time-warp pulse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WarpStage {
    /// Easing from the previous scale to the target
    EaseIn(Tween),
    /// Holding at the target
    Hold { target: f32, remaining: f32 },
    /// Easing back to 1.0
    EaseOut(Tween),
}

/// A time-warp pulse: ease to a target, hold, ease back to nominal speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWarp {
    pub stage: WarpStage,
    hold: f32,
    ease_out: f32,
}

impl TimeWarp {
    pub fn new(current: f32, target: f32, ease_in: f32, hold: f32, ease_out: f32) -> Self {
        Self {
            stage: WarpStage::EaseIn(Tween::new(current, target, ease_in)),
            hold,
            ease_out,
        }
    }

    /// Advance the pulse. Returns the time scale and whether the pulse is done.
    pub fn advance(&mut self, dt: f32) -> (f32, bool) {
        match &mut self.stage {
            WarpStage::EaseIn(tween) => {
                let value = tween.advance(dt);
                if tween.finished() {
                    self.stage = WarpStage::Hold {
                        target: tween.to,
                        remaining: self.hold,
                    };
                }
                (value, false)
            }
            WarpStage::Hold { target, remaining } => {
                *remaining -= dt;
                let value = *target;
                if *remaining <= 0.0 {
                    self.stage = WarpStage::EaseOut(Tween::new(value, 1.0, self.ease_out));
                }
                (value, false)
            }
            WarpStage::EaseOut(tween) => {
                let value = tween.advance(dt);
                (value, tween.finished())
            }
        }
    }
}

/// Cosmetic camera shake, linearly fading out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shake {
    pub intensity: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl Shake {
    pub fn new(intensity: f32, duration: f32) -> Self {
        Self {
            intensity,
            duration,
            elapsed: 0.0,
        }
    }

    /// Current amplitude in pixels (renderers pick the direction)
    pub fn magnitude(&self) -> f32 {
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            return 0.0;
        }
        self.intensity * (1.0 - self.elapsed / self.duration)
    }

    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }
}
