//! Kinetic entities: the shared physics body plus players, enemies,
//! projectiles and shard pickups.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;
use crate::upgrades::UpgradeFlags;

/// Physics body shared by players, enemies and bosses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Half width / half height
    pub half: Vec2,
    /// Only written by the vertical collision pass
    pub on_ground: bool,
    pub hp: f32,
    pub max_hp: f32,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, hp: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half: size / 2.0,
            on_ground: false,
            hp,
            max_hp: hp,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.half)
    }

    /// Negative or zero hp counts as dead
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    #[inline]
    pub fn airborne(&self) -> bool {
        !self.on_ground
    }

    /// Subtract `amount` unless already dead. Returns true if it was applied.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() || amount <= 0.0 {
            return false;
        }
        self.hp -= amount;
        true
    }
}

/// Combat styles (cosmetic stance, selectable with the style switch upgrade)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Style {
    #[default]
    Sword,
    Magic,
    Gun,
}

/// Kind of a player's most recent attack, read by enemy retaliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    Melee,
    Magic,
}

/// A player-controlled fighter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u8,
    pub body: Body,
    /// ±1
    pub facing: f32,
    pub jumps: u8,
    pub dash_cooldown: f32,
    pub dash_charges: u8,
    pub combo: u32,
    /// Seconds until the combo lapses
    pub combo_timer: f32,
    /// Seconds of contact-damage immunity left
    pub iframes: f32,
    pub last_attack: Option<AttackKind>,
    pub style: Style,
    /// Active grapple anchor
    pub grapple: Option<Vec2>,
    pub upgrades: UpgradeFlags,
    pub alive: bool,
    /// Disabled players (unused co-op slot) are skipped entirely
    pub enabled: bool,
}

impl Player {
    pub fn new(id: u8, pos: Vec2, upgrades: UpgradeFlags) -> Self {
        Self {
            id,
            body: Body::new(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT), PLAYER_MAX_HP),
            facing: 1.0,
            jumps: MAX_JUMPS,
            dash_cooldown: 0.0,
            dash_charges: upgrades.max_dash_charges(),
            combo: 0,
            combo_timer: 0.0,
            iframes: 0.0,
            last_attack: None,
            style: Style::Sword,
            grapple: None,
            upgrades,
            alive: true,
            enabled: true,
        }
    }

    /// Whether the simulation should update this player
    #[inline]
    pub fn active(&self) -> bool {
        self.enabled && self.alive
    }

    /// Restore hp and life for a realm restart
    pub fn revive(&mut self) {
        self.body.hp = self.body.max_hp;
        self.alive = true;
        self.combo = 0;
        self.combo_timer = 0.0;
        self.iframes = 0.0;
        self.grapple = None;
    }

    /// Register a landed hit and restart the combo window
    pub fn register_hit(&mut self, window: f32) {
        self.combo = (self.combo + 1).min(MAX_COMBO);
        self.combo_timer = window;
    }

    /// Run down the combo window; returns true if the combo just lapsed
    pub fn decay_combo(&mut self, dt: f32) -> bool {
        if self.combo_timer > 0.0 {
            self.combo_timer = (self.combo_timer - dt).max(0.0);
            if self.combo_timer == 0.0 && self.combo > 0 {
                self.combo = 0;
                return true;
            }
        }
        false
    }
}

/// Enemy tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Brute,
}

impl EnemyKind {
    pub fn max_hp(&self) -> f32 {
        match self {
            EnemyKind::Grunt => 40.0,
            EnemyKind::Brute => 70.0,
        }
    }

    pub fn speed(&self) -> f32 {
        match self {
            EnemyKind::Grunt => 200.0,
            EnemyKind::Brute => 160.0,
        }
    }

    /// Damage taken from an unblocked melee hit
    pub fn melee_damage_taken(&self) -> f32 {
        match self {
            EnemyKind::Grunt => 16.0,
            EnemyKind::Brute => 12.0,
        }
    }

    /// Damage dealt on body contact
    pub fn contact_damage(&self) -> f32 {
        match self {
            EnemyKind::Grunt => 8.0,
            EnemyKind::Brute => 12.0,
        }
    }
}

pub const ENEMY_WIDTH: f32 = 36.0;
pub const ENEMY_HEIGHT: f32 = 44.0;

/// A wave enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub body: Body,
    /// Seconds left of melee resistance
    pub block_melee: f32,
    /// Seconds left of magic resistance
    pub block_magic: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            kind,
            body: Body::new(pos, Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT), kind.max_hp()),
            block_melee: 0.0,
            block_magic: 0.0,
        }
    }

    /// Damage multiplier for an incoming attack of `kind`
    pub fn block_factor(&self, kind: AttackKind) -> f32 {
        let timer = match kind {
            AttackKind::Melee => self.block_melee,
            AttackKind::Magic => self.block_magic,
        };
        if timer > 0.0 { BLOCK_MULTIPLIER } else { 1.0 }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player(u8),
    /// Boss hazard bullets: telegraphs that never hit entities
    Boss,
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left
    pub life: f32,
    pub damage: f32,
    pub owner: BulletOwner,
    pub ricocheted: bool,
}

impl Bullet {
    pub fn hazard(pos: Vec2, vel: Vec2, life: f32) -> Self {
        Self {
            pos,
            vel,
            life,
            damage: 0.0,
            owner: BulletOwner::Boss,
            ricocheted: false,
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.life <= 0.0
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(BULLET_HALF_SIZE))
    }
}

/// A collectible shard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shard {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub life: f32,
}

impl Shard {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(SHARD_HALF_SIZE))
    }
}

/// Unit vector from `from` toward `to`, safe for coincident points
pub fn direction(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let dist = delta.length() + DIR_EPSILON;
    (delta / dist, dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_noop_when_dead() {
        let mut body = Body::new(Vec2::ZERO, Vec2::new(10.0, 10.0), 5.0);
        assert!(body.take_damage(5.0));
        assert!(!body.is_alive());
        assert!(!body.take_damage(3.0));
        assert_eq!(body.hp, 0.0);
    }

    #[test]
    fn test_combo_decay() {
        let mut p = Player::new(1, Vec2::ZERO, UpgradeFlags::default());
        p.register_hit(2.0);
        p.register_hit(2.0);
        assert_eq!(p.combo, 2);
        assert!(!p.decay_combo(1.0));
        assert_eq!(p.combo, 2);
        assert!(p.decay_combo(1.5));
        assert_eq!(p.combo, 0);
    }

    #[test]
    fn test_combo_capped() {
        let mut p = Player::new(1, Vec2::ZERO, UpgradeFlags::default());
        p.combo = MAX_COMBO;
        p.register_hit(1.0);
        assert_eq!(p.combo, MAX_COMBO);
    }

    #[test]
    fn test_block_factor() {
        let mut e = Enemy::new(EnemyKind::Brute, Vec2::ZERO);
        assert_eq!(e.block_factor(AttackKind::Melee), 1.0);
        e.block_melee = 0.5;
        assert_eq!(e.block_factor(AttackKind::Melee), BLOCK_MULTIPLIER);
        assert_eq!(e.block_factor(AttackKind::Magic), 1.0);
    }

    #[test]
    fn test_direction_degenerate_is_finite() {
        let (dir, dist) = direction(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0));
        assert!(dir.is_finite());
        assert_eq!(dir, Vec2::ZERO);
        assert!(dist > 0.0);
    }
}
