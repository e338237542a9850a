//! Boss behaviors
//!
//! Four bosses share one `Boss` struct. Per-kind timers live in
//! `PatternState` and a single `update` dispatches on it, then runs the
//! shared tail every boss goes through: homing toward the nearest player,
//! gravity integration and platform collision.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{self, BodyKind};
use super::entity::{Body, Bullet, Player};
use super::events::{GameEvent, HitSource, Target};
use super::modifiers::WorldModifiers;
use super::platform::Platform;
use super::pool::Pool;
use super::rect::Rect;
use super::state::Arena;
use crate::consts::CONTACT_IFRAMES;
use crate::{lerp, sign};

/// Horizontal homing blend per tick
const HOMING_LERP: f32 = 0.05;
/// Bosses enrage below this fraction of max hp
const ENRAGE_FRACTION: f32 = 0.5;

const CLONE_LIFE: f32 = 3.0;
const CLONE_HALF_SIZE: f32 = 20.0;
const CLONE_DAMAGE: f32 = 10.0;
const CLONE_HOMING_LERP: f32 = 0.1;
const CLONE_GRAVITY_FACTOR: f32 = 0.6;
const CLONE_SPAWN_JITTER: f32 = 60.0;

/// The four boss kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    AirborneTitan,
    MirrorSwarm,
    GravitySerpent,
    ChronoWarden,
}

impl BossKind {
    pub const ALL: [BossKind; 4] = [
        BossKind::AirborneTitan,
        BossKind::MirrorSwarm,
        BossKind::GravitySerpent,
        BossKind::ChronoWarden,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BossKind::AirborneTitan => "Airborne Titan",
            BossKind::MirrorSwarm => "Mirror Swarm",
            BossKind::GravitySerpent => "Gravity Serpent",
            BossKind::ChronoWarden => "Chrono Warden",
        }
    }

    /// Look up a boss by display name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn size(&self) -> Vec2 {
        match self {
            BossKind::AirborneTitan => Vec2::new(110.0, 140.0),
            BossKind::MirrorSwarm => Vec2::new(90.0, 110.0),
            BossKind::GravitySerpent | BossKind::ChronoWarden => Vec2::new(100.0, 120.0),
        }
    }

    pub fn max_hp(&self) -> f32 {
        match self {
            BossKind::AirborneTitan => 800.0,
            BossKind::MirrorSwarm => 700.0,
            BossKind::GravitySerpent => 760.0,
            BossKind::ChronoWarden => 780.0,
        }
    }

    fn gravity_factor(&self) -> f32 {
        match self {
            BossKind::MirrorSwarm => 0.3,
            _ => 0.8,
        }
    }

    fn homing_speed(&self, enraged: bool) -> f32 {
        match (self, enraged) {
            (BossKind::AirborneTitan, false) => 110.0,
            (BossKind::AirborneTitan, true) => 160.0,
            (BossKind::MirrorSwarm, false) => 90.0,
            (BossKind::MirrorSwarm, true) => 130.0,
            (BossKind::GravitySerpent, false) => 120.0,
            (BossKind::GravitySerpent, true) => 170.0,
            (BossKind::ChronoWarden, false) => 110.0,
            (BossKind::ChronoWarden, true) => 150.0,
        }
    }

    fn initial_pattern(&self) -> PatternState {
        match self {
            BossKind::AirborneTitan => PatternState::Titan,
            BossKind::MirrorSwarm => PatternState::Mirror {
                clone_timer: 0.0,
                clones: Vec::new(),
            },
            BossKind::GravitySerpent => PatternState::Serpent { twist_timer: 0.0 },
            BossKind::ChronoWarden => PatternState::Warden { warp_timer: 0.0 },
        }
    }
}

/// A short-lived homing clone spawned by the Mirror Swarm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorClone {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
}

impl MirrorClone {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(CLONE_HALF_SIZE))
    }
}

/// Per-kind pattern timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternState {
    /// Leaps off the attack cooldown alone
    Titan,
    Mirror {
        clone_timer: f32,
        clones: Vec<MirrorClone>,
    },
    Serpent {
        twist_timer: f32,
    },
    Warden {
        warp_timer: f32,
    },
}

/// Everything a boss may read or write during its update
pub struct BossContext<'a, R: Rng> {
    pub players: &'a mut [Player],
    pub platforms: &'a mut [Platform],
    pub bullets: &'a mut Pool<Bullet>,
    pub modifiers: &'a mut WorldModifiers,
    pub arena: &'a Arena,
    pub rng: &'a mut R,
    pub events: &'a mut Vec<GameEvent>,
}

/// Nearest active player to `from`; ties go to the lower id
pub fn nearest_player(players: &[Player], from: Vec2) -> Option<&Player> {
    players.iter().filter(|p| p.active()).min_by(|a, b| {
        a.body
            .pos
            .distance_squared(from)
            .total_cmp(&b.body.pos.distance_squared(from))
    })
}

/// The active boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    pub body: Body,
    /// Set once when hp first drops below half
    pub enraged: bool,
    /// Attack cooldown (seconds)
    pub cooldown: f32,
    pub pattern: PatternState,
}

impl Boss {
    pub fn new(kind: BossKind, pos: Vec2) -> Self {
        Self {
            kind,
            body: Body::new(pos, kind.size(), kind.max_hp()),
            enraged: false,
            cooldown: 0.0,
            pattern: kind.initial_pattern(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Live clones (empty for every kind but the Mirror Swarm)
    pub fn clones(&self) -> &[MirrorClone] {
        match &self.pattern {
            PatternState::Mirror { clones, .. } => clones,
            _ => &[],
        }
    }

    /// Apply damage from `source`, emitting hit and enrage events. Zero damage
    /// and hits on a dead boss are ignored. Returns true if damage was dealt.
    pub fn apply_damage(
        &mut self,
        amount: f32,
        source: HitSource,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !self.body.take_damage(amount) {
            return false;
        }
        events.push(GameEvent::EntityHit {
            target: Target::Boss(self.kind),
            source,
            damage: amount,
            pos: self.body.pos,
            blocked: false,
        });
        if !self.enraged && self.body.hp < self.body.max_hp * ENRAGE_FRACTION {
            self.enraged = true;
            log::info!("{} is enraged", self.name());
            events.push(GameEvent::BossEnraged { kind: self.kind });
        }
        true
    }

    pub fn update<R: Rng>(&mut self, ctx: &mut BossContext<'_, R>, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        let g = ctx.modifiers.gravity_dir;
        let enraged = self.enraged;

        match &mut self.pattern {
            PatternState::Titan => {
                if self.body.on_ground && self.cooldown <= 0.0 {
                    let leap = if enraged { 740.0 } else { 600.0 };
                    self.body.vel.y -= leap * g;
                    self.cooldown = if enraged { 1.4 } else { 2.2 };
                    let feet = Vec2::new(self.body.pos.x, self.body.pos.y + self.body.half.y * g);
                    for i in -2..=2 {
                        ctx.bullets.insert(Bullet::hazard(
                            feet,
                            Vec2::new(i as f32 * 160.0, 160.0 * g),
                            1.6,
                        ));
                    }
                    log::debug!("Titan slam");
                }
            }
            PatternState::Mirror { clone_timer, clones } => {
                *clone_timer += dt;
                let period = if enraged { 2.2 } else { 3.2 };
                if *clone_timer > period {
                    *clone_timer = 0.0;
                    let jitter = ctx.rng.random_range(-CLONE_SPAWN_JITTER..CLONE_SPAWN_JITTER);
                    clones.push(MirrorClone {
                        pos: Vec2::new(self.body.pos.x + jitter, self.body.pos.y),
                        vel: Vec2::ZERO,
                        life: CLONE_LIFE,
                    });
                    log::debug!("The swarm mirrors your move");
                }
                let clone_speed = if enraged { 300.0 } else { 220.0 };
                for clone in clones.iter_mut() {
                    if let Some(target) = nearest_player(ctx.players, clone.pos) {
                        let dir = sign(target.body.pos.x - clone.pos.x);
                        clone.vel.x = lerp(clone.vel.x, dir * clone_speed, CLONE_HOMING_LERP);
                    }
                    clone.vel.y += ctx.modifiers.gravity(CLONE_GRAVITY_FACTOR) * dt;
                    clone.pos += clone.vel * dt;
                    clone.life -= dt;
                    let rect = clone.rect();
                    for player in ctx.players.iter_mut() {
                        if !player.active() || player.iframes > 0.0 {
                            continue;
                        }
                        if rect.overlaps(&player.body.rect()) && player.body.take_damage(CLONE_DAMAGE) {
                            player.iframes = CONTACT_IFRAMES;
                            ctx.events.push(GameEvent::EntityHit {
                                target: Target::Player(player.id),
                                source: HitSource::Clone,
                                damage: CLONE_DAMAGE,
                                pos: player.body.pos,
                                blocked: false,
                            });
                        }
                    }
                }
                clones.retain(|c| c.life > 0.0);

                if self.cooldown <= 0.0 {
                    self.cooldown = if enraged { 1.8 } else { 2.6 };
                    for i in 0..6 {
                        let a = i as f32;
                        ctx.bullets.insert(Bullet::hazard(
                            self.body.pos,
                            Vec2::new(a.cos(), a.sin()) * 140.0,
                            1.6,
                        ));
                    }
                }
            }
            PatternState::Serpent { twist_timer } => {
                *twist_timer += dt;
                let period = if enraged { 1.4 } else { 2.2 };
                if *twist_timer > period {
                    *twist_timer = 0.0;
                    ctx.modifiers.request_flip();
                    log::info!("The serpent twists gravity");
                    let dir = if ctx.rng.random_bool(0.5) { -1.0 } else { 1.0 };
                    let (dash, hop) = if enraged { (520.0, 200.0) } else { (420.0, 140.0) };
                    self.body.vel.x = dir * dash;
                    self.body.vel.y -= hop * g;
                }
            }
            PatternState::Warden { warp_timer } => {
                *warp_timer += dt;
                let period = if enraged { 2.2 } else { 3.2 };
                if *warp_timer > period {
                    *warp_timer = 0.0;
                    let target = ctx.rng.random_range(0.5..1.8);
                    ctx.modifiers.pulse_to(target);
                    log::info!("Time heaves and lurches");
                    for i in 0..12 {
                        let a = i as f32 / 12.0 * std::f32::consts::TAU;
                        ctx.bullets.insert(Bullet::hazard(
                            self.body.pos,
                            Vec2::new(a.cos(), a.sin()) * 180.0,
                            1.4,
                        ));
                    }
                }
            }
        }

        // Shared tail: gravity, homing, collision
        self.body.vel.y += ctx.modifiers.gravity(self.kind.gravity_factor()) * dt;
        if let Some(target) = nearest_player(ctx.players, self.body.pos) {
            let dir = sign(target.body.pos.x - self.body.pos.x);
            let speed = self.kind.homing_speed(enraged);
            self.body.vel.x = lerp(self.body.vel.x, dir * speed, HOMING_LERP);
        }
        collision::resolve(
            &mut self.body,
            ctx.platforms,
            g,
            ctx.arena,
            BodyKind::Npc,
            dt,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::BulletOwner;
    use crate::sim::modifiers::ModifierConfig;
    use crate::upgrades::UpgradeFlags;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Fixture {
        players: Vec<Player>,
        platforms: Vec<Platform>,
        bullets: Pool<Bullet>,
        modifiers: WorldModifiers,
        arena: Arena,
        rng: Pcg32,
        events: Vec<GameEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                players: vec![Player::new(1, Vec2::new(200.0, 300.0), UpgradeFlags::default())],
                platforms: vec![Platform::new(0.0, 500.0, 800.0, 20.0, 1e9)],
                bullets: Pool::new(),
                modifiers: WorldModifiers::new(ModifierConfig::default(), 760.0),
                arena: Arena::new(800.0, 600.0),
                rng: Pcg32::seed_from_u64(9),
                events: Vec::new(),
            }
        }

        fn step(&mut self, boss: &mut Boss, dt: f32) {
            let mut ctx = BossContext {
                players: &mut self.players,
                platforms: &mut self.platforms,
                bullets: &mut self.bullets,
                modifiers: &mut self.modifiers,
                arena: &self.arena,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            boss.update(&mut ctx, dt);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(BossKind::from_name("chrono warden"), Some(BossKind::ChronoWarden));
        assert_eq!(BossKind::from_name("Airborne Titan"), Some(BossKind::AirborneTitan));
        assert_eq!(BossKind::from_name("nobody"), None);
    }

    #[test]
    fn test_enrage_once_below_half() {
        let mut boss = Boss::new(BossKind::AirborneTitan, Vec2::ZERO);
        let mut events = Vec::new();
        boss.apply_damage(400.0, HitSource::Melee, &mut events);
        assert!(!boss.enraged, "exactly half is not enraged");
        boss.apply_damage(1.0, HitSource::Melee, &mut events);
        assert!(boss.enraged);
        boss.apply_damage(1.0, HitSource::Melee, &mut events);
        let enrages = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BossEnraged { .. }))
            .count();
        assert_eq!(enrages, 1);
    }

    #[test]
    fn test_zero_damage_is_ignored() {
        let mut boss = Boss::new(BossKind::MirrorSwarm, Vec2::ZERO);
        let mut events = Vec::new();
        assert!(!boss.apply_damage(0.0, HitSource::Magic, &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn test_titan_leaps_from_ground_and_sprays_hazards() {
        let mut fx = Fixture::new();
        let mut boss = Boss::new(BossKind::AirborneTitan, Vec2::new(600.0, 430.0));
        boss.body.on_ground = true;
        fx.step(&mut boss, 0.016);
        assert_eq!(fx.bullets.len(), 5);
        assert!(fx.bullets.iter().all(|b| b.owner == BulletOwner::Boss && b.damage == 0.0));
        assert!(boss.body.vel.y < 0.0);
        assert_eq!(boss.cooldown, 2.2);
    }

    #[test]
    fn test_titan_waits_for_cooldown() {
        let mut fx = Fixture::new();
        let mut boss = Boss::new(BossKind::AirborneTitan, Vec2::new(600.0, 430.0));
        boss.body.on_ground = true;
        boss.cooldown = 1.0;
        fx.step(&mut boss, 0.016);
        assert!(fx.bullets.is_empty());
    }

    #[test]
    fn test_serpent_flip_is_deferred() {
        let mut fx = Fixture::new();
        let mut boss = Boss::new(BossKind::GravitySerpent, Vec2::new(600.0, 300.0));
        if let PatternState::Serpent { twist_timer } = &mut boss.pattern {
            *twist_timer = 2.19;
        }
        fx.step(&mut boss, 0.02);
        assert_eq!(fx.modifiers.gravity_dir, 1.0);
        assert!(fx.modifiers.pending_flip);
        assert!(boss.body.vel.x.abs() > 300.0);
    }

    #[test]
    fn test_warden_pulses_and_rings() {
        let mut fx = Fixture::new();
        let mut boss = Boss::new(BossKind::ChronoWarden, Vec2::new(600.0, 300.0));
        if let PatternState::Warden { warp_timer } = &mut boss.pattern {
            *warp_timer = 3.19;
        }
        fx.step(&mut boss, 0.02);
        assert!(fx.modifiers.pulsing());
        assert_eq!(fx.bullets.len(), 12);
    }

    #[test]
    fn test_mirror_clone_hits_respect_iframes() {
        let mut fx = Fixture::new();
        let mut boss = Boss::new(BossKind::MirrorSwarm, Vec2::new(600.0, 300.0));
        boss.pattern = PatternState::Mirror {
            clone_timer: 0.0,
            clones: vec![MirrorClone {
                pos: Vec2::new(200.0, 300.0),
                vel: Vec2::ZERO,
                life: 3.0,
            }],
        };
        fx.step(&mut boss, 0.01);
        assert_eq!(fx.players[0].body.hp, 90.0);
        assert_eq!(fx.players[0].iframes, CONTACT_IFRAMES);
        fx.step(&mut boss, 0.01);
        assert_eq!(fx.players[0].body.hp, 90.0);
        // ring fired on the first update
        assert_eq!(fx.bullets.len(), 6);
    }

    #[test]
    fn test_mirror_clones_expire() {
        let mut fx = Fixture::new();
        let mut boss = Boss::new(BossKind::MirrorSwarm, Vec2::new(600.0, 300.0));
        if let PatternState::Mirror { clone_timer, .. } = &mut boss.pattern {
            *clone_timer = 3.19;
        }
        fx.step(&mut boss, 0.02);
        assert_eq!(boss.clones().len(), 1);
        for _ in 0..155 {
            fx.step(&mut boss, 0.02);
        }
        assert!(boss.clones().is_empty());
    }

    #[test]
    fn test_every_boss_homes_toward_player() {
        for kind in BossKind::ALL {
            let mut fx = Fixture::new();
            let mut boss = Boss::new(kind, Vec2::new(600.0, 300.0));
            boss.cooldown = 10.0;
            fx.step(&mut boss, 0.01);
            assert!(boss.body.vel.x < 0.0, "{:?} should move toward the player", kind);
        }
    }
}
