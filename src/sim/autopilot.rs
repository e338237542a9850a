//! Demo input generator
//!
//! Drives enabled players toward the boss (or the nearest enemy) for headless
//! runs and attract loops. It reads the state but never touches the RNG, so
//! an autopiloted run stays deterministic.

use glam::Vec2;

use super::entity::Player;
use super::input::{PlayerInput, TickInput};
use super::state::GameState;
use crate::sign;

/// Horizontal distance at which the autopilot stops closing in
const ENGAGE_RANGE: f32 = 60.0;
/// Vertical gap (against gravity) that makes it jump
const JUMP_GAP: f32 = 80.0;

/// Stateless-per-tick demo driver; keeps only a tick counter for cadence
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    ticks: u64,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce intents for every player slot
    pub fn input(&mut self, state: &GameState) -> TickInput {
        self.ticks += 1;
        let mut input = TickInput::default();
        for (slot, player) in state.players.iter().take(2).enumerate() {
            if player.active() {
                input.players[slot] = self.steer(state, player);
            }
        }
        input
    }

    fn steer(&self, state: &GameState, player: &Player) -> PlayerInput {
        let Some(target) = pick_target(state, player.body.pos) else {
            return PlayerInput::default();
        };
        let g = state.modifiers.gravity_dir;
        let delta = target - player.body.pos;
        // Stagger the two players so they don't move in lockstep
        let t = self.ticks + u64::from(player.id) * 7;

        let close = delta.x.abs() < ENGAGE_RANGE;
        let axis = if close {
            // Wobble a little while engaged
            ((t as f32) * 0.05).sin() * 0.3
        } else {
            sign(delta.x)
        };
        // Above the player relative to gravity
        let target_above = delta.y * g < -JUMP_GAP;
        let airborne_moment = player.body.airborne() && player.jumps > 0;

        PlayerInput {
            axis,
            jump: (player.body.on_ground && (target_above || close) && t % 40 == 0)
                || (airborne_moment && target_above && t % 25 == 0),
            melee: close && t % 12 == 0,
            magic: !close && delta.y.abs() < 80.0 && sign(delta.x) == player.facing && t % 30 == 0,
            dash: !close && delta.x.abs() > 300.0 && t % 90 == 0,
            ..Default::default()
        }
    }
}

/// The boss if present, otherwise the nearest living enemy
fn pick_target(state: &GameState, from: Vec2) -> Option<Vec2> {
    if let Some(boss) = state.boss.as_ref().filter(|b| b.body.is_alive()) {
        return Some(boss.body.pos);
    }
    state
        .enemies
        .iter()
        .filter(|e| e.body.is_alive())
        .map(|e| e.body.pos)
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::tick::tick;

    #[test]
    fn test_idle_without_targets() {
        let state = GameState::empty(GameConfig::default());
        let mut pilot = Autopilot::new();
        assert_eq!(pilot.input(&state), TickInput::default());
    }

    #[test]
    fn test_heads_toward_enemy() {
        let mut state = GameState::empty(GameConfig::default());
        state.players[0].body.pos = Vec2::new(100.0, 300.0);
        state.spawn_wave(1);
        if let Some(e) = state.enemies.iter_mut().next() {
            e.body.pos = Vec2::new(900.0, 300.0);
        }
        let mut pilot = Autopilot::new();
        let input = pilot.input(&state);
        assert_eq!(input.players[0].axis, 1.0);
        assert_eq!(input.players[1], PlayerInput::default());
    }

    #[test]
    fn test_autopilot_run_is_deterministic() {
        let run = || {
            let mut state = GameState::new(GameConfig {
                seed: 31,
                coop: true,
                ..Default::default()
            });
            let mut pilot = Autopilot::new();
            for _ in 0..400 {
                let input = pilot.input(&state);
                tick(&mut state, &input, 1.0 / 60.0);
            }
            (state.ticks, state.shard_count, state.players[0].body.pos)
        };
        assert_eq!(run(), run());
    }
}
