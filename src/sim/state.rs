//! Game state and realm lifecycle
//!
//! Everything the tick mutates lives in `GameState`. All randomness comes from
//! the one seeded `Pcg32` stored here, so a config plus an input script fully
//! determines a run.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, BossKind};
use super::entity::{Bullet, Enemy, EnemyKind, Player, Shard};
use super::events::{EventSink, GameEvent, dispatch};
use super::modifiers::WorldModifiers;
use super::platform::Platform;
use super::pool::Pool;
use super::rect::Rect;
use super::tween::Shake;
use crate::consts::*;
use crate::settings::GameConfig;
use crate::upgrades::{PurchaseError, UpgradeFlags, UpgradeId, UpgradeShop};

/// Realm catalog, entered in order by `next_realm`
pub const REALM_NAMES: [&str; 8] = [
    "Genesis Expanse",
    "Shattered Echoes",
    "Chrono Gully",
    "Ember Vault",
    "Dusk Frontier",
    "Rift Plateau",
    "Glacier Chasm",
    "Zenith Apex",
];

/// Platforms generated per arena (plus the floor)
const ARENA_PLATFORMS: usize = 10;
const PLATFORM_HEIGHT: f32 = 18.0;
const FLOOR_HEIGHT: f32 = 22.0;
/// Chance a spawned enemy is a Brute
const BRUTE_CHANCE: f64 = 0.25;
/// Boss placement attempts before settling for the last candidate
const BOSS_PLACEMENT_TRIES: usize = 40;
const BOSS_MIN_PLAYER_DISTANCE: f32 = 220.0;

/// Arena bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Beyond the void margin above or below the arena
    #[inline]
    pub fn is_void(&self, y: f32) -> bool {
        y > self.height + VOID_MARGIN || y < -VOID_MARGIN
    }

    pub fn respawn_point(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, VOID_RESPAWN_Y)
    }

    /// Y of the lowest generated platform tier
    pub fn floor_y(&self) -> f32 {
        self.height * 0.75
    }

    pub fn player_spawn(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.2)
    }
}

/// Whether the realm is still being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealmPhase {
    Active,
    /// Every enabled player has fallen; frozen until restart
    Defeated,
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty
pub(crate) fn sample_range<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub rng: Pcg32,
    pub arena: Arena,
    pub platforms: Vec<Platform>,
    /// Player slots in id order; slot 1 is only enabled in co-op
    pub players: Vec<Player>,
    pub enemies: Pool<Enemy>,
    pub bullets: Pool<Bullet>,
    pub shards: Pool<Shard>,
    pub boss: Option<Boss>,
    /// Seconds until the boss arrives; `None` once it has spawned
    pub boss_timer: Option<f32>,
    pub modifiers: WorldModifiers,
    pub realm_index: usize,
    /// Shards collected this run
    pub shard_count: u64,
    pub shop: UpgradeShop,
    /// Gameplay seconds since realm entry (time-scaled)
    pub time: f32,
    pub ticks: u64,
    pub phase: RealmPhase,
    /// Events queued during the current tick
    pub events: Vec<GameEvent>,
    pub shake: Option<Shake>,
}

impl GameState {
    /// Create a state and enter the configured realm
    pub fn new(config: GameConfig) -> Self {
        let mut state = Self::empty(config);
        state.realm_index = state.configured_realm();
        state.restart_realm();
        state
    }

    /// A state with players but no platforms, enemies or boss schedule.
    /// Scripted scenarios build on this.
    pub fn empty(config: GameConfig) -> Self {
        let arena = Arena::new(config.arena_width, config.arena_height);
        let modifiers = WorldModifiers::new(
            config.modifier_config(),
            arena.height + HAZARD_START_OFFSET,
        );
        let spawn = arena.player_spawn();
        let upgrades = config.upgrades;
        let mut partner = Player::new(2, spawn + Vec2::new(COOP_SPAWN_OFFSET, 0.0), upgrades);
        partner.enabled = config.coop;

        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            arena,
            platforms: Vec::new(),
            players: vec![Player::new(1, spawn, upgrades), partner],
            enemies: Pool::new(),
            bullets: Pool::new(),
            shards: Pool::new(),
            boss: None,
            boss_timer: None,
            modifiers,
            realm_index: 0,
            shard_count: 0,
            shop: UpgradeShop::new(),
            time: 0.0,
            ticks: 0,
            phase: RealmPhase::Active,
            events: Vec::new(),
            shake: None,
            config,
        }
    }

    fn configured_realm(&self) -> usize {
        let Some(name) = self.config.world.as_ref().and_then(|w| w.realm.as_deref()) else {
            return 0;
        };
        REALM_NAMES
            .iter()
            .position(|realm| realm.eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                log::warn!("Unknown realm '{}', entering {}", name, REALM_NAMES[0]);
                0
            })
    }

    pub fn realm_name(&self) -> &'static str {
        REALM_NAMES[self.realm_index % REALM_NAMES.len()]
    }

    /// Rebuild the arena and platform set
    pub fn build_arena(&mut self) {
        self.platforms.clear();
        let assist = self.config.assist;
        let (w, h) = (self.arena.width, self.arena.height);
        let floor_y = self.arena.floor_y();
        for i in 0..ARENA_PLATFORMS {
            let pw = sample_range(&mut self.rng, 140.0, 260.0);
            let x = sample_range(&mut self.rng, 40.0, w - 40.0 - pw);
            let y = floor_y - i as f32 * sample_range(&mut self.rng, 68.0, 95.0);
            let platform = Platform::generate(&mut self.rng, x, y, pw, PLATFORM_HEIGHT, assist);
            self.platforms.push(platform);
        }
        let mut floor = Platform::generate(
            &mut self.rng,
            40.0,
            floor_y + 80.0,
            (w - 80.0).max(1.0),
            FLOOR_HEIGHT,
            assist,
        );
        floor.oscillation = None;
        self.platforms.push(floor);
        log::debug!("Built arena {}x{} with {} platforms", w, h, self.platforms.len());
    }

    /// Spawn `n` enemies at random positions in the upper arena
    pub fn spawn_wave(&mut self, n: usize) {
        for _ in 0..n {
            let kind = if self.rng.random_bool(BRUTE_CHANCE) {
                EnemyKind::Brute
            } else {
                EnemyKind::Grunt
            };
            let x = sample_range(&mut self.rng, 80.0, self.arena.width - 80.0);
            let y = sample_range(&mut self.rng, 60.0, self.arena.height * 0.4);
            self.enemies.insert(Enemy::new(kind, Vec2::new(x, y)));
        }
    }

    /// Spawn the realm boss if none is active. The configured boss is used
    /// when set, otherwise one is picked at random.
    pub fn spawn_boss(&mut self) {
        if self.boss.is_some() {
            return;
        }
        let kind = self
            .config
            .forced_boss()
            .unwrap_or_else(|| BossKind::ALL[self.rng.random_range(0..BossKind::ALL.len())]);
        let anchor = self
            .players
            .iter()
            .find(|p| p.active())
            .map(|p| p.body.rect());

        let mut boss = Boss::new(kind, Vec2::ZERO);
        for _ in 0..BOSS_PLACEMENT_TRIES {
            boss.body.pos.x = sample_range(&mut self.rng, 120.0, self.arena.width - 120.0);
            boss.body.pos.y = sample_range(&mut self.rng, 80.0, self.arena.height * 0.45);
            let Some(player) = anchor else {
                break;
            };
            if clear_of(&boss.body.rect(), &player) {
                break;
            }
        }

        self.modifiers.suppress_pulses(PULSE_GRACE_ON_BOSS);
        log::info!("{} enters the realm", kind.name());
        self.events.push(GameEvent::BossSpawned {
            kind,
            pos: boss.body.pos,
        });
        self.boss = Some(boss);
    }

    /// Scatter `count` shards from `pos`, thrown against gravity
    pub fn spawn_shards(&mut self, pos: Vec2, count: usize) {
        if count == 0 {
            return;
        }
        let g = self.modifiers.gravity_dir;
        for _ in 0..count {
            let vx = self.rng.random_range(-120.0..120.0);
            let vy = self.rng.random_range(-220.0..-80.0) * g;
            self.shards.insert(Shard {
                pos,
                vel: Vec2::new(vx, vy),
                gravity: SHARD_GRAVITY,
                life: SHARD_LIFE,
            });
        }
        self.events.push(GameEvent::PickupSpawned { pos, count });
    }

    /// Upgrade flags for every player: the configured start plus purchases
    pub fn upgrade_flags(&self) -> UpgradeFlags {
        let mut flags = self.config.upgrades;
        for id in &self.shop.owned {
            flags.apply(*id);
        }
        flags
    }

    /// Buy an upgrade with collected shards and apply it to every player
    pub fn purchase(&mut self, id: UpgradeId) -> Result<(), PurchaseError> {
        self.shop.purchase(id, &mut self.shard_count)?;
        let flags = self.upgrade_flags();
        for player in &mut self.players {
            player.upgrades = flags;
        }
        Ok(())
    }

    /// Start the current realm over: fresh arena, wave and boss schedule,
    /// revived players. Shards and upgrades carry over.
    pub fn restart_realm(&mut self) {
        self.build_arena();
        self.enemies.clear();
        self.bullets.clear();
        self.shards.clear();
        self.boss = None;
        self.boss_timer = Some(BOSS_SPAWN_DELAY);
        self.modifiers.reset(self.arena.height + HAZARD_START_OFFSET);
        self.spawn_wave(INITIAL_WAVE);

        let spawn = self.arena.player_spawn();
        let flags = self.upgrade_flags();
        for player in &mut self.players {
            let offset = if player.id == 1 { 0.0 } else { COOP_SPAWN_OFFSET };
            player.revive();
            player.upgrades = flags;
            player.body.pos = spawn + Vec2::new(offset, 0.0);
            player.body.vel = Vec2::ZERO;
            player.jumps = MAX_JUMPS;
            player.dash_charges = flags.max_dash_charges();
            player.dash_cooldown = 0.0;
        }

        self.time = 0.0;
        self.phase = RealmPhase::Active;
        self.shake = None;
        log::info!("Entering {}", self.realm_name());
    }

    /// Advance to the next realm in the catalog (wrapping) and restart
    pub fn next_realm(&mut self) {
        self.realm_index = (self.realm_index + 1) % REALM_NAMES.len();
        self.restart_realm();
    }

    /// Start (or replace) a screen shake if shakes are enabled
    pub fn trigger_shake(&mut self, intensity: f32, duration: f32) {
        request_shake(&mut self.shake, self.config.screen_shake, intensity, duration);
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deliver queued events to `sink` (if any) and clear the queue
    pub fn dispatch_events(&mut self, sink: Option<&mut dyn EventSink>) {
        dispatch(&mut self.events, sink);
    }
}

/// Candidate boss rect is far enough from and not overlapping the player
fn clear_of(boss: &Rect, player: &Rect) -> bool {
    let dx = (boss.center().x - player.center().x).abs();
    dx > BOSS_MIN_PLAYER_DISTANCE && !boss.overlaps(player)
}

/// Shake slot update usable while other state fields are borrowed
pub(crate) fn request_shake(slot: &mut Option<Shake>, enabled: bool, intensity: f32, duration: f32) {
    if enabled {
        *slot = Some(Shake::new(intensity, duration));
    }
}
