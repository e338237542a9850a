//! Outbound simulation events
//!
//! Events are plain data queued during a tick and drained by the host
//! afterwards. Delivery is optional: with no sink attached they are simply
//! discarded.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BossKind;
use super::entity::EnemyKind;

/// What was hit or died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Player(u8),
    Enemy(EnemyKind),
    Boss(BossKind),
}

/// Source of a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    Melee,
    Magic,
    Contact,
    Clone,
    Void,
}

/// Events emitted during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntityHit {
        target: Target,
        source: HitSource,
        damage: f32,
        pos: Vec2,
        /// Damage was reduced by an active block
        blocked: bool,
    },
    EntityDied {
        target: Target,
        pos: Vec2,
    },
    BossSpawned {
        kind: BossKind,
        pos: Vec2,
    },
    BossDefeated {
        kind: BossKind,
        pos: Vec2,
    },
    BossEnraged {
        kind: BossKind,
    },
    GravityFlipped {
        direction: f32,
    },
    PickupSpawned {
        pos: Vec2,
        count: usize,
    },
    PickupCollected {
        player: u8,
        total: u64,
    },
    ComboUpdated {
        player: u8,
        combo: u32,
    },
    /// A player's hp reached zero
    PlayerFell {
        player: u8,
    },
}

/// Receiver for simulation events (rendering, audio, achievements...)
pub trait EventSink {
    fn on_event(&mut self, event: &GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

/// Sink that writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EntityHit { .. } | GameEvent::ComboUpdated { .. } => {
                log::trace!("{:?}", event)
            }
            GameEvent::PlayerFell { player } => log::warn!("Player {} fell", player),
            _ => log::info!("{:?}", event),
        }
    }
}

/// Deliver queued events to `sink` if there is one, clearing the queue
pub fn dispatch(events: &mut Vec<GameEvent>, sink: Option<&mut dyn EventSink>) {
    if let Some(sink) = sink {
        for event in events.iter() {
            sink.on_event(event);
        }
    }
    events.clear();
}
