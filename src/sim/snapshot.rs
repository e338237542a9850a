//! Read-only views of the simulation for renderers and tooling

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BossKind;
use super::entity::{EnemyKind, Style};
use super::rect::Rect;
use super::state::{GameState, RealmPhase};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub facing: f32,
    pub on_ground: bool,
    pub combo: u32,
    pub style: Style,
    pub alive: bool,
    pub grapple: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub hp: f32,
    /// Either block timer is running
    pub blocking: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossView {
    pub kind: BossKind,
    pub name: String,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub enraged: bool,
    pub clones: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformView {
    pub rect: Rect,
    /// Decay progress in [0, 1]
    pub wear: f32,
}

/// Everything a renderer or HUD needs after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ticks: u64,
    pub time: f32,
    pub realm: String,
    pub phase: RealmPhase,
    pub gravity_dir: f32,
    pub time_scale: f32,
    pub hazard_y: f32,
    /// Current screen shake amplitude (0 when idle)
    pub shake: f32,
    pub players: Vec<PlayerView>,
    pub enemies: Vec<EnemyView>,
    pub boss: Option<BossView>,
    pub platforms: Vec<PlatformView>,
    pub bullets: Vec<Vec2>,
    pub shards: Vec<Vec2>,
    pub shard_count: u64,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            ticks: state.ticks,
            time: state.time,
            realm: state.realm_name().to_string(),
            phase: state.phase,
            gravity_dir: state.modifiers.gravity_dir,
            time_scale: state.modifiers.time_scale,
            hazard_y: state.modifiers.hazard_y,
            shake: state.shake.map_or(0.0, |s| s.magnitude()),
            players: state
                .players
                .iter()
                .filter(|p| p.enabled)
                .map(|p| PlayerView {
                    id: p.id,
                    pos: p.body.pos,
                    vel: p.body.vel,
                    hp: p.body.hp.max(0.0),
                    facing: p.facing,
                    on_ground: p.body.on_ground,
                    combo: p.combo,
                    style: p.style,
                    alive: p.alive,
                    grapple: p.grapple,
                })
                .collect(),
            enemies: state
                .enemies
                .iter()
                .map(|e| EnemyView {
                    kind: e.kind,
                    pos: e.body.pos,
                    hp: e.body.hp,
                    blocking: e.block_melee > 0.0 || e.block_magic > 0.0,
                })
                .collect(),
            boss: state.boss.as_ref().map(|b| BossView {
                kind: b.kind,
                name: b.name().to_string(),
                pos: b.body.pos,
                hp: b.body.hp.max(0.0),
                max_hp: b.body.max_hp,
                enraged: b.enraged,
                clones: b.clones().iter().map(|c| c.pos).collect(),
            }),
            platforms: state
                .platforms
                .iter()
                .filter(|p| !p.dead)
                .map(|p| PlatformView {
                    rect: p.rect,
                    wear: p.wear(),
                })
                .collect(),
            bullets: state.bullets.iter().map(|b| b.pos).collect(),
            shards: state.shards.iter().map(|s| s.pos).collect(),
            shard_count: state.shard_count,
        }
    }

    /// Compact JSON for logging and tooling
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;

    #[test]
    fn test_capture_counts() {
        let state = GameState::new(GameConfig::default());
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.players.len(), 1);
        assert_eq!(snap.enemies.len(), state.enemies.len());
        assert_eq!(snap.platforms.len(), state.platforms.len());
        assert!(snap.boss.is_none());
        assert_eq!(snap.gravity_dir, 1.0);
        assert_eq!(snap.realm, "Genesis Expanse");
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = GameState::new(GameConfig {
            coop: true,
            ..Default::default()
        });
        state.spawn_boss();
        let snap = Snapshot::capture(&state);
        let json = snap.to_json().unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.players.len(), 2);
        assert_eq!(back.boss.map(|b| b.kind), snap.boss.map(|b| b.kind));
        assert_eq!(back.platforms.len(), snap.platforms.len());
        assert_eq!(back.phase, RealmPhase::Active);
    }
}
