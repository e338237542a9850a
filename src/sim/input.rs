//! Per-tick player intents
//!
//! Input is sampled by the host and handed to the simulation as plain data.
//! Edge-triggered actions (jump, attacks, dash) are true only on the tick the
//! button went down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Style;

/// One player's intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Horizontal axis in [-1, 1]
    pub axis: f32,
    pub jump: bool,
    pub melee: bool,
    pub magic: bool,
    pub dash: bool,
    /// World-space grapple target; set on the tick the grapple fires
    pub grapple: Option<Vec2>,
    /// Let go of an active grapple
    pub release_grapple: bool,
    /// Requested combat style (needs the style switch upgrade)
    pub style: Option<Style>,
}

impl PlayerInput {
    /// Axis clamped to [-1, 1], with NaN treated as no input
    pub fn clamped_axis(&self) -> f32 {
        if self.axis.is_nan() {
            0.0
        } else {
            self.axis.clamp(-1.0, 1.0)
        }
    }
}

/// Intents for every player slot in one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub players: [PlayerInput; 2],
}

impl TickInput {
    /// Input for player one only
    pub fn single(input: PlayerInput) -> Self {
        Self {
            players: [input, PlayerInput::default()],
        }
    }

    /// Input for the player with `id` (1-based)
    pub fn for_player(&self, id: u8) -> PlayerInput {
        match id {
            1 => self.players[0],
            2 => self.players[1],
            _ => PlayerInput::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_clamped() {
        let input = PlayerInput {
            axis: 3.0,
            ..Default::default()
        };
        assert_eq!(input.clamped_axis(), 1.0);
        let input = PlayerInput {
            axis: f32::NAN,
            ..Default::default()
        };
        assert_eq!(input.clamped_axis(), 0.0);
    }

    #[test]
    fn test_for_player() {
        let input = TickInput::single(PlayerInput {
            jump: true,
            ..Default::default()
        });
        assert!(input.for_player(1).jump);
        assert!(!input.for_player(2).jump);
        assert_eq!(input.for_player(7), PlayerInput::default());
    }
}
