//! Frame driver
//!
//! Turns host timestamps into clamped frame deltas and gates updates behind
//! the pause state. Drawing happens every frame, paused or not.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_DT;

/// Something driven once per frame
pub trait FrameHost {
    /// Advance by `dt` seconds (already clamped)
    fn update(&mut self, dt: f32);
    fn draw(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriverState {
    #[default]
    Running,
    Paused,
}

/// Clamped-delta frame loop with a pause gate
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    state: DriverState,
    /// Timestamp of the previous frame (seconds)
    last_time: Option<f64>,
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == DriverState::Paused
    }

    /// Frames driven so far (paused frames included)
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            DriverState::Running => DriverState::Paused,
            DriverState::Paused => DriverState::Running,
        };
        log::info!("Driver {:?}", self.state);
    }

    pub fn set_paused(&mut self, paused: bool) {
        let target = if paused {
            DriverState::Paused
        } else {
            DriverState::Running
        };
        if self.state != target {
            self.toggle_pause();
        }
    }

    /// Delta for a frame at `now`: clamped to [0, MAX_FRAME_DT], zero on the
    /// first frame or when the clock misbehaves
    fn frame_delta(&self, now: f64) -> f32 {
        let Some(last) = self.last_time else {
            return 0.0;
        };
        let dt = (now - last) as f32;
        if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        }
    }

    /// Drive one frame at timestamp `now` (seconds). Returns the delta used.
    pub fn tick<H: FrameHost + ?Sized>(&mut self, now: f64, host: &mut H) -> f32 {
        let dt = self.frame_delta(now);
        self.last_time = Some(now);
        self.frames += 1;
        if self.state == DriverState::Running {
            host.update(dt);
        }
        host.draw();
        dt
    }
}
