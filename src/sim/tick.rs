//! Per-frame simulation tick
//!
//! Order within a tick is fixed:
//! modifiers → boss arrival → hazard → platforms → players → bullets → hit
//! tests → enemies → boss → shards → cleanup → wave refill → defeat check.
//!
//! Modifier schedules and the boss timer run on real time; everything after
//! runs on the time-scaled delta.

use rand::Rng;

use super::boss::{BossContext, nearest_player};
use super::collision::{self, BodyKind};
use super::combat;
use super::entity::direction;
use super::events::{GameEvent, HitSource, Target};
use super::input::TickInput;
use super::state::{GameState, RealmPhase, request_shake};
use crate::consts::*;
use crate::{lerp, sign};

/// Enemy homing blend per tick
const ENEMY_HOMING_LERP: f32 = 0.08;
const ENEMY_GRAVITY_FACTOR: f32 = 0.9;
const ENEMY_HOP_CHANCE: f64 = 0.01;
const ENEMY_HOP_VELOCITY: f32 = 420.0;
/// Facing only follows velocity above this speed
const FACING_DEADZONE: f32 = 6.0;
const AXIS_DEADZONE: f32 = 0.001;

/// Screen shake presets (intensity px, duration s)
const SHAKE_DASH: (f32, f32) = (6.0, 0.12);
const SHAKE_HIT: (f32, f32) = (6.0, 0.15);
const SHAKE_VOID: (f32, f32) = (10.0, 0.2);

/// Advance the game state by one frame of `dt` real seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase == RealmPhase::Defeated {
        return;
    }
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    state.ticks += 1;

    state.modifiers.update(dt, &mut state.rng, &mut state.events);

    let boss_due = match state.boss_timer.as_mut() {
        Some(timer) => {
            *timer -= dt;
            *timer <= 0.0
        }
        None => false,
    };
    if boss_due {
        state.boss_timer = None;
        state.spawn_boss();
    }

    let sdt = state.modifiers.scaled(dt);
    state.time += sdt;
    let enraged = state.boss.as_ref().is_some_and(|b| b.enraged);
    state.modifiers.advance_hazard(sdt, enraged);

    for platform in &mut state.platforms {
        platform.update(sdt, state.time);
        platform.cull_off_screen(state.arena.width);
    }

    update_players(state, input, sdt);

    combat::advance_bullets(
        &mut state.bullets,
        &state.players,
        &state.modifiers,
        &state.arena,
        sdt,
    );
    combat::resolve_bullet_hits(
        &mut state.bullets,
        &mut state.enemies,
        state.boss.as_mut(),
        &mut state.players,
        &mut state.events,
    );

    update_enemies(state, sdt);

    if let Some(boss) = state.boss.as_mut() {
        if boss.body.is_alive() {
            let mut ctx = BossContext {
                players: &mut state.players,
                platforms: &mut state.platforms,
                bullets: &mut state.bullets,
                modifiers: &mut state.modifiers,
                arena: &state.arena,
                rng: &mut state.rng,
                events: &mut state.events,
            };
            boss.update(&mut ctx, sdt);
        }
    }
    // Clone hits land inside the boss update
    mark_fallen(state);

    update_shards(state, sdt);
    prune(state);
    refill_wave(state);

    let shake_done = state.shake.as_mut().is_some_and(|s| s.advance(dt));
    if shake_done {
        state.shake = None;
    }

    check_defeat(state);
}

fn update_players(state: &mut GameState, input: &TickInput, dt: f32) {
    let g = state.modifiers.gravity_dir;
    let gravity = state.modifiers.gravity(1.0);
    let shake_enabled = state.config.screen_shake;

    for player in state.players.iter_mut() {
        if !player.active() {
            continue;
        }
        let intent = input.for_player(player.id);

        player.dash_cooldown = (player.dash_cooldown - dt).max(0.0);
        player.iframes = (player.iframes - dt).max(0.0);
        if player.decay_combo(dt) {
            state.events.push(GameEvent::ComboUpdated {
                player: player.id,
                combo: 0,
            });
        }
        if player.body.on_ground {
            player.jumps = MAX_JUMPS;
            player.dash_charges = player.upgrades.max_dash_charges();
        }

        // Horizontal accel / friction
        let axis = intent.clamped_axis();
        let body = &mut player.body;
        let control = if body.on_ground { 1.0 } else { AIR_CONTROL };
        body.vel.x += axis * MOVE_ACCEL * control * dt;
        if axis.abs() < AXIS_DEADZONE {
            let friction_rate = if body.on_ground {
                GROUND_FRICTION
            } else {
                AIR_FRICTION
            };
            let friction = friction_rate * dt;
            body.vel.x = if body.vel.x > 0.0 {
                (body.vel.x - friction).max(0.0)
            } else {
                (body.vel.x + friction).min(0.0)
            };
        }
        body.vel.x = body.vel.x.clamp(-MAX_RUN_SPEED, MAX_RUN_SPEED);
        body.vel.y += gravity * dt;
        if body.vel.x.abs() > FACING_DEADZONE {
            player.facing = sign(player.body.vel.x);
        }

        if let Some(style) = intent.style {
            if player.upgrades.style_switch {
                player.style = style;
            }
        }

        if intent.jump && (player.body.on_ground || player.jumps > 0) {
            player.body.vel.y -= JUMP_VELOCITY * g;
            player.jumps = player.jumps.saturating_sub(1);
        }

        if intent.melee {
            combat::melee(player, &mut state.enemies, state.boss.as_mut(), &mut state.events);
        }
        if intent.magic {
            combat::cast_magic(player, &mut state.bullets, &mut state.rng);
        }
        if intent.dash && combat::dash(player) {
            request_shake(&mut state.shake, shake_enabled, SHAKE_DASH.0, SHAKE_DASH.1);
        }

        if let Some(anchor) = intent.grapple {
            player.grapple = Some(anchor);
        }
        if intent.release_grapple {
            player.grapple = None;
        }
        if let Some(anchor) = player.grapple {
            let (dir, dist) = direction(player.body.pos, anchor);
            let pull = if player.upgrades.grapple_boost {
                GRAPPLE_PULL_BOOSTED
            } else {
                GRAPPLE_PULL
            };
            player.body.vel += dir * pull * dt;
            if dist < GRAPPLE_RELEASE_DIST {
                player.grapple = None;
            }
        }

        let res = collision::resolve(
            &mut player.body,
            &mut state.platforms,
            g,
            &state.arena,
            BodyKind::Player,
            dt,
        );
        if res.lost_to_void {
            log::warn!("Player {} lost to the void", player.id);
            player.grapple = None;
            state.events.push(GameEvent::EntityHit {
                target: Target::Player(player.id),
                source: HitSource::Void,
                damage: VOID_DAMAGE,
                pos: player.body.pos,
                blocked: false,
            });
            request_shake(&mut state.shake, shake_enabled, SHAKE_VOID.0, SHAKE_VOID.1);
        }
    }

    mark_fallen(state);
}

/// Flag players whose hp ran out (from any source) as fallen
fn mark_fallen(state: &mut GameState) {
    for player in state.players.iter_mut() {
        if player.active() && !player.body.is_alive() {
            player.alive = false;
            player.grapple = None;
            log::warn!("Player {} fell", player.id);
            state.events.push(GameEvent::PlayerFell { player: player.id });
        }
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let g = state.modifiers.gravity_dir;
    let gravity = state.modifiers.gravity(ENEMY_GRAVITY_FACTOR);
    let shake_enabled = state.config.screen_shake;

    for enemy in state.enemies.iter_mut() {
        if !enemy.body.is_alive() {
            continue;
        }
        if let Some(target) = nearest_player(&state.players, enemy.body.pos) {
            combat::retaliate(enemy, target);
            let dir = sign(target.body.pos.x - enemy.body.pos.x);
            enemy.body.vel.x = lerp(enemy.body.vel.x, dir * enemy.kind.speed(), ENEMY_HOMING_LERP);
        }
        enemy.block_melee = (enemy.block_melee - dt).max(0.0);
        enemy.block_magic = (enemy.block_magic - dt).max(0.0);

        enemy.body.vel.y += gravity * dt;
        if enemy.body.on_ground && state.rng.random_bool(ENEMY_HOP_CHANCE) {
            enemy.body.vel.y -= ENEMY_HOP_VELOCITY * g;
        }
        collision::resolve(
            &mut enemy.body,
            &mut state.platforms,
            g,
            &state.arena,
            BodyKind::Npc,
            dt,
        );

        for player in state.players.iter_mut() {
            if combat::contact_damage(player, enemy, &mut state.events) {
                request_shake(&mut state.shake, shake_enabled, SHAKE_HIT.0, SHAKE_HIT.1);
            }
        }
    }

    mark_fallen(state);
}

fn update_shards(state: &mut GameState, dt: f32) {
    let g = state.modifiers.gravity_dir;
    for shard in state.shards.iter_mut() {
        shard.vel.y += shard.gravity * g * dt;
        shard.pos += shard.vel * dt;
        shard.life -= dt;
        if shard.life <= 0.0 {
            continue;
        }
        let rect = shard.rect();
        let collector = state
            .players
            .iter()
            .find(|p| p.active() && p.body.is_alive() && rect.overlaps(&p.body.rect()));
        if let Some(player) = collector {
            shard.life = 0.0;
            state.shard_count += 1;
            state.events.push(GameEvent::PickupCollected {
                player: player.id,
                total: state.shard_count,
            });
        }
    }
}

/// One compaction pass per pool. Every removed enemy (and a defeated boss)
/// produces exactly one death event and one pickup spawn.
fn prune(state: &mut GameState) {
    state.bullets.compact(|b| !b.expired());
    state.shards.compact(|s| s.life > 0.0);
    state.platforms.retain(|p| !p.dead);

    let fallen = state.enemies.compact(|e| e.body.is_alive());
    for enemy in fallen {
        let pos = enemy.body.pos;
        state.events.push(GameEvent::EntityDied {
            target: Target::Enemy(enemy.kind),
            pos,
        });
        let drop = state.rng.random_range(3..7);
        state.spawn_shards(pos, drop);
    }

    if state.boss.as_ref().is_some_and(|b| !b.body.is_alive()) {
        if let Some(boss) = state.boss.take() {
            let pos = boss.body.pos;
            log::info!("{} defeated! Realm stabilizing", boss.name());
            state.events.push(GameEvent::EntityDied {
                target: Target::Boss(boss.kind),
                pos,
            });
            state.events.push(GameEvent::BossDefeated {
                kind: boss.kind,
                pos,
            });
            state.spawn_shards(pos, BOSS_SHARD_DROP);
        }
    }
}

/// Keep pressure up while there is no boss or the boss is below half hp
fn refill_wave(state: &mut GameState) {
    let boss_weakened = state
        .boss
        .as_ref()
        .is_none_or(|b| b.body.hp < b.body.max_hp * 0.5);
    if state.enemies.len() < MIN_ENEMIES && boss_weakened {
        state.spawn_wave(1);
    }
}

fn check_defeat(state: &mut GameState) {
    let all_down = state
        .players
        .iter()
        .filter(|p| p.enabled)
        .all(|p| !p.alive);
    if all_down {
        state.phase = RealmPhase::Defeated;
        log::warn!("All players down in {}", state.realm_name());
    }
}
