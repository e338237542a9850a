//! Environmental modifiers: gravity flips, time-warp pulses, the hazard plane
//!
//! `WorldModifiers` is the only owner of these globals. It is passed by
//! reference to everything that reads them, and gravity only ever changes at
//! the top of a tick so every entity sees one direction per frame.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::tween::TimeWarp;
use crate::consts::*;

/// Modifier tuning, overridable per world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierConfig {
    pub gravity: f32,
    /// Seconds between scheduled gravity flips
    pub grav_flip_every: f32,
    /// Seconds between scheduled time pulses
    pub time_pulse_every: f32,
    pub time_pulse_min: f32,
    pub time_pulse_max: f32,
    pub hazard_rise_speed: f32,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            grav_flip_every: GRAV_FLIP_EVERY,
            time_pulse_every: TIME_PULSE_EVERY,
            time_pulse_min: TIME_PULSE_MIN,
            time_pulse_max: TIME_PULSE_MAX,
            hazard_rise_speed: HAZARD_RISE_SPEED,
        }
    }
}

/// Global gravity/time/hazard state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldModifiers {
    pub config: ModifierConfig,
    /// +1 = down, -1 = up
    pub gravity_dir: f32,
    /// Gameplay time multiplier (nominal 1.0)
    pub time_scale: f32,
    /// Y position of the hazard plane
    pub hazard_y: f32,
    /// Unscaled seconds since realm entry
    pub clock: f32,
    pub next_grav_flip: f32,
    pub next_time_pulse: f32,
    /// Scheduled pulses are skipped until the clock passes this
    pub pulse_grace_until: f32,
    /// Flip requested mid-tick, applied at the next tick boundary
    pub pending_flip: bool,
    pub warp: Option<TimeWarp>,
}

impl WorldModifiers {
    pub fn new(config: ModifierConfig, hazard_y: f32) -> Self {
        Self {
            config,
            gravity_dir: 1.0,
            time_scale: 1.0,
            hazard_y,
            clock: 0.0,
            next_grav_flip: config.grav_flip_every,
            next_time_pulse: config.time_pulse_every,
            pulse_grace_until: PULSE_GRACE_ON_ENTRY,
            pending_flip: false,
            warp: None,
        }
    }

    /// Reset schedules for a fresh realm attempt
    pub fn reset(&mut self, hazard_y: f32) {
        *self = Self::new(self.config, hazard_y);
    }

    /// Gravity acceleration scaled by `factor`, signed by direction
    #[inline]
    pub fn gravity(&self, factor: f32) -> f32 {
        self.config.gravity * factor * self.gravity_dir
    }

    /// Gameplay delta for a real frame delta
    #[inline]
    pub fn scaled(&self, dt: f32) -> f32 {
        dt * self.time_scale
    }

    /// Advance schedules by the real (unscaled) frame delta. Runs first in a
    /// tick; this is the only place `gravity_dir` changes.
    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R, events: &mut Vec<GameEvent>) {
        self.clock += dt;

        let mut flip = std::mem::take(&mut self.pending_flip);
        if self.clock > self.next_grav_flip {
            self.next_grav_flip = self.clock + self.config.grav_flip_every;
            flip = !flip;
        }
        // Two flips landing on the same boundary cancel out
        if flip {
            self.gravity_dir = -self.gravity_dir;
            log::info!(
                "Gravity flipped {}",
                if self.gravity_dir > 0.0 { "DOWN" } else { "UP" }
            );
            events.push(GameEvent::GravityFlipped {
                direction: self.gravity_dir,
            });
        }

        if self.clock > self.next_time_pulse && self.clock > self.pulse_grace_until {
            self.next_time_pulse = self.clock + self.config.time_pulse_every;
            let (lo, hi) = (self.config.time_pulse_min, self.config.time_pulse_max);
            let target = if hi > lo { rng.random_range(lo..hi) } else { lo };
            self.pulse_to(target);
        }

        if let Some(warp) = self.warp.as_mut() {
            let (scale, done) = warp.advance(dt);
            self.time_scale = scale;
            if done {
                self.time_scale = 1.0;
                self.warp = None;
            }
        }
    }

    /// Start a time-warp pulse from the current scale, replacing any active one
    pub fn pulse_to(&mut self, target: f32) {
        log::debug!("Time pulse {:.2} -> {:.2}", self.time_scale, target);
        self.warp = Some(TimeWarp::new(
            self.time_scale,
            target,
            PULSE_EASE_IN,
            PULSE_HOLD,
            PULSE_EASE_OUT,
        ));
    }

    /// Ask for a gravity flip at the next tick boundary
    pub fn request_flip(&mut self) {
        self.pending_flip = !self.pending_flip;
    }

    /// Block scheduled pulses for `secs` from now
    pub fn suppress_pulses(&mut self, secs: f32) {
        self.pulse_grace_until = self.pulse_grace_until.max(self.clock + secs);
    }

    /// Move the hazard plane against gravity by the gameplay delta
    pub fn advance_hazard(&mut self, dt: f32, boss_enraged: bool) {
        let mult = if boss_enraged { HAZARD_ENRAGE_MULT } else { 1.0 };
        self.hazard_y -= self.gravity_dir * self.config.hazard_rise_speed * mult * dt;
    }

    pub fn pulsing(&self) -> bool {
        self.warp.is_some()
    }
}
