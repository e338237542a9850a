//! Combat resolution: melee, magic projectiles, dashes, blocks and combos
//!
//! All damage goes through `Body::take_damage` (or `Boss::apply_damage`), so
//! a target already at zero hp silently ignores further hits in the same
//! frame. Block timers are always read before damage is subtracted.
//!
//! Bosses only take damage from airborne attackers. Grounded melee and magic
//! deal exactly zero to every boss kind.

use glam::Vec2;
use rand::Rng;

use super::boss::Boss;
use super::entity::{AttackKind, Bullet, BulletOwner, Enemy, Player};
use super::events::{GameEvent, HitSource, Target};
use super::modifiers::WorldModifiers;
use super::pool::Pool;
use super::rect::Rect;
use super::state::Arena;
use crate::consts::*;
use crate::sign;

/// Melee hitbox: a fixed-reach strip extending from the attacker's facing edge
pub fn melee_hitbox(player: &Player) -> Rect {
    let r = player.body.rect();
    let x = if player.facing > 0.0 {
        r.right()
    } else {
        r.left() - MELEE_REACH
    };
    Rect::new(x, r.y + MELEE_INSET, MELEE_REACH, r.h - 2.0 * MELEE_INSET)
}

/// Melee damage against a boss: zero unless the attacker is airborne
pub fn boss_melee_damage(player: &Player) -> f32 {
    if player.body.airborne() {
        (MELEE_BOSS_DAMAGE * player.upgrades.aerial_damage).round()
    } else {
        0.0
    }
}

/// Magic damage against a boss: zero unless the caster is airborne
pub fn boss_magic_damage(caster_airborne: bool) -> f32 {
    if caster_airborne {
        MAGIC_BOSS_DAMAGE
    } else {
        0.0
    }
}

/// What a melee swing connected with
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeleeOutcome {
    pub enemies_hit: usize,
    /// Damage dealt to the boss (0 when grounded or missed)
    pub boss_damage: f32,
    /// The swing reached the boss but was shrugged off
    pub boss_shrugged: bool,
}

impl MeleeOutcome {
    pub fn landed(&self) -> bool {
        self.enemies_hit > 0 || self.boss_damage > 0.0
    }
}

/// Swing at everything inside the hitbox
pub fn melee(
    player: &mut Player,
    enemies: &mut Pool<Enemy>,
    boss: Option<&mut Boss>,
    events: &mut Vec<GameEvent>,
) -> MeleeOutcome {
    player.last_attack = Some(AttackKind::Melee);
    let hitbox = melee_hitbox(player);
    let mut outcome = MeleeOutcome::default();

    for enemy in enemies.iter_mut() {
        if !enemy.body.is_alive() || !hitbox.overlaps(&enemy.body.rect()) {
            continue;
        }
        let factor = enemy.block_factor(AttackKind::Melee);
        let damage = enemy.kind.melee_damage_taken() * factor;
        if enemy.body.take_damage(damage) {
            outcome.enemies_hit += 1;
            if factor < 1.0 {
                log::debug!("Enemy blocked melee");
            }
            events.push(GameEvent::EntityHit {
                target: Target::Enemy(enemy.kind),
                source: HitSource::Melee,
                damage,
                pos: enemy.body.pos,
                blocked: factor < 1.0,
            });
        }
    }

    if let Some(boss) = boss {
        if boss.body.is_alive() && hitbox.overlaps(&boss.body.rect()) {
            let damage = boss_melee_damage(player);
            if boss.apply_damage(damage, HitSource::Melee, events) {
                outcome.boss_damage = damage;
            } else {
                outcome.boss_shrugged = true;
            }
        }
    }

    if outcome.landed() {
        player.register_hit(MELEE_COMBO_WINDOW);
        events.push(GameEvent::ComboUpdated {
            player: player.id,
            combo: player.combo,
        });
    }
    outcome
}

/// Fire a magic bolt along the facing axis with a small random spread
pub fn cast_magic<R: Rng>(player: &mut Player, bullets: &mut Pool<Bullet>, rng: &mut R) {
    player.last_attack = Some(AttackKind::Magic);
    let base = if player.facing > 0.0 {
        0.0
    } else {
        std::f32::consts::PI
    };
    let angle = base + rng.random_range(-MAGIC_SPREAD..MAGIC_SPREAD);
    bullets.insert(Bullet {
        pos: player.body.pos - Vec2::new(0.0, 10.0),
        vel: Vec2::new(angle.cos(), angle.sin()) * MAGIC_SPEED,
        life: MAGIC_LIFE,
        damage: MAGIC_DAMAGE,
        owner: BulletOwner::Player(player.id),
        ricocheted: false,
    });
}

/// Spend a dash charge for a horizontal impulse. Returns true if it fired.
pub fn dash(player: &mut Player) -> bool {
    if player.dash_cooldown > 0.0 || player.dash_charges == 0 {
        return false;
    }
    player.body.vel.x += DASH_IMPULSE * player.facing;
    player.dash_cooldown = DASH_COOLDOWN;
    player.dash_charges -= 1;
    true
}

/// Integrate projectiles and apply ricochet for owners with the upgrade
pub fn advance_bullets(
    bullets: &mut Pool<Bullet>,
    players: &[Player],
    modifiers: &WorldModifiers,
    arena: &Arena,
    dt: f32,
) {
    let gravity = modifiers.gravity(BULLET_GRAVITY_FACTOR);
    for bullet in bullets.iter_mut() {
        bullet.pos += bullet.vel * dt;
        bullet.vel.y += gravity * dt;
        bullet.life -= dt;

        let can_ricochet = match bullet.owner {
            BulletOwner::Player(id) => players
                .iter()
                .any(|p| p.id == id && p.upgrades.ricochet),
            BulletOwner::Boss => false,
        };
        if can_ricochet && !bullet.ricocheted && bullet.life < RICOCHET_ARM_LIFE {
            if bullet.pos.x < 0.0 || bullet.pos.x > arena.width {
                bullet.vel.x = -bullet.vel.x;
                bullet.ricocheted = true;
            }
            if bullet.pos.y < 0.0 || bullet.pos.y > arena.height {
                bullet.vel.y = -bullet.vel.y;
                bullet.ricocheted = true;
            }
        }
    }
}

/// Test player projectiles against enemies and the boss. A projectile is
/// consumed by its first hit.
pub fn resolve_bullet_hits(
    bullets: &mut Pool<Bullet>,
    enemies: &mut Pool<Enemy>,
    mut boss: Option<&mut Boss>,
    players: &mut [Player],
    events: &mut Vec<GameEvent>,
) {
    for bullet in bullets.iter_mut() {
        if bullet.expired() {
            continue;
        }
        let BulletOwner::Player(owner) = bullet.owner else {
            continue;
        };
        let rect = bullet.rect();
        let mut landed = false;

        for enemy in enemies.iter_mut() {
            if !enemy.body.is_alive() || !rect.overlaps(&enemy.body.rect()) {
                continue;
            }
            let factor = enemy.block_factor(AttackKind::Magic);
            let damage = bullet.damage * factor;
            enemy.body.take_damage(damage);
            bullet.life = 0.0;
            landed = true;
            if factor < 1.0 {
                log::debug!("Enemy resisted magic");
            }
            events.push(GameEvent::EntityHit {
                target: Target::Enemy(enemy.kind),
                source: HitSource::Magic,
                damage,
                pos: enemy.body.pos,
                blocked: factor < 1.0,
            });
            break;
        }

        if !bullet.expired() {
            if let Some(boss) = boss.as_deref_mut() {
                if boss.body.is_alive() && rect.overlaps(&boss.body.rect()) {
                    let airborne = players
                        .iter()
                        .find(|p| p.id == owner)
                        .is_some_and(|p| p.body.airborne());
                    let damage = boss_magic_damage(airborne);
                    landed |= boss.apply_damage(damage, HitSource::Magic, events);
                    bullet.life = 0.0;
                }
            }
        }

        if landed {
            if let Some(player) = players.iter_mut().find(|p| p.id == owner) {
                player.register_hit(MAGIC_COMBO_WINDOW);
                events.push(GameEvent::ComboUpdated {
                    player: player.id,
                    combo: player.combo,
                });
            }
        }
    }
}

/// Enemies start blocking the attack kind a player is spamming
pub fn retaliate(enemy: &mut Enemy, target: &Player) {
    if target.combo <= RETALIATION_COMBO {
        return;
    }
    match target.last_attack {
        Some(AttackKind::Melee) => enemy.block_melee = BLOCK_DURATION,
        Some(AttackKind::Magic) => enemy.block_magic = BLOCK_DURATION,
        None => {}
    }
}

/// Body contact: damage the player (respecting iframes) and knock them away
pub fn contact_damage(player: &mut Player, enemy: &Enemy, events: &mut Vec<GameEvent>) -> bool {
    if !player.active() || !enemy.body.is_alive() || player.iframes > 0.0 {
        return false;
    }
    if !player.body.rect().overlaps(&enemy.body.rect()) {
        return false;
    }
    let damage = enemy.kind.contact_damage();
    if !player.body.take_damage(damage) {
        return false;
    }
    player.iframes = CONTACT_IFRAMES;
    let mut away = sign(player.body.pos.x - enemy.body.pos.x);
    if away == 0.0 {
        away = -player.facing;
    }
    player.body.vel.x += away * CONTACT_KNOCKBACK;
    events.push(GameEvent::EntityHit {
        target: Target::Player(player.id),
        source: HitSource::Contact,
        damage,
        pos: player.body.pos,
        blocked: false,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::BossKind;
    use crate::sim::entity::EnemyKind;
    use crate::sim::modifiers::ModifierConfig;
    use crate::upgrades::UpgradeFlags;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player_at(x: f32, y: f32, grounded: bool) -> Player {
        let mut p = Player::new(1, Vec2::new(x, y), UpgradeFlags::default());
        p.body.on_ground = grounded;
        p
    }

    #[test]
    fn test_melee_hitbox_follows_facing() {
        let mut p = player_at(100.0, 100.0, true);
        let hb = melee_hitbox(&p);
        assert_eq!(hb.left(), 124.0);
        assert_eq!(hb.w, MELEE_REACH);
        assert_eq!(hb.top(), 68.0 + MELEE_INSET);
        assert_eq!(hb.h, 64.0 - 20.0);
        p.facing = -1.0;
        assert_eq!(melee_hitbox(&p).right(), 76.0);
    }

    #[test]
    fn test_melee_damages_enemy_and_builds_combo() {
        let mut p = player_at(100.0, 100.0, true);
        let mut enemies = Pool::new();
        enemies.insert(Enemy::new(EnemyKind::Grunt, Vec2::new(140.0, 100.0)));
        let mut events = Vec::new();
        let out = melee(&mut p, &mut enemies, None, &mut events);
        assert_eq!(out.enemies_hit, 1);
        assert_eq!(enemies.get(0).unwrap().body.hp, 24.0);
        assert_eq!(p.combo, 1);
        assert_eq!(p.combo_timer, MELEE_COMBO_WINDOW);
    }

    #[test]
    fn test_melee_blocked_quarter_damage() {
        let mut p = player_at(100.0, 100.0, true);
        let mut enemies = Pool::new();
        let mut brute = Enemy::new(EnemyKind::Brute, Vec2::new(140.0, 100.0));
        brute.block_melee = 1.0;
        enemies.insert(brute);
        let mut events = Vec::new();
        melee(&mut p, &mut enemies, None, &mut events);
        assert_eq!(enemies.get(0).unwrap().body.hp, 70.0 - 12.0 * 0.25);
        assert!(matches!(events[0], GameEvent::EntityHit { blocked: true, .. }));
    }

    #[test]
    fn test_melee_whiff_keeps_combo() {
        let mut p = player_at(100.0, 100.0, true);
        p.combo = 3;
        let mut enemies: Pool<Enemy> = Pool::new();
        let mut events = Vec::new();
        let out = melee(&mut p, &mut enemies, None, &mut events);
        assert!(!out.landed());
        assert_eq!(p.combo, 3);
        assert_eq!(p.last_attack, Some(AttackKind::Melee));
    }

    #[test]
    fn test_melee_skips_dead_enemies() {
        let mut p = player_at(100.0, 100.0, true);
        let mut enemies = Pool::new();
        let mut dead = Enemy::new(EnemyKind::Grunt, Vec2::new(140.0, 100.0));
        dead.body.hp = 0.0;
        enemies.insert(dead);
        let mut events = Vec::new();
        let out = melee(&mut p, &mut enemies, None, &mut events);
        assert_eq!(out.enemies_hit, 0);
        assert!(events.is_empty());
        assert_eq!(enemies.get(0).unwrap().body.hp, 0.0);
    }

    #[test]
    fn test_boss_melee_only_when_airborne_for_every_kind() {
        for kind in BossKind::ALL {
            let mut boss = Boss::new(kind, Vec2::new(160.0, 100.0));
            let mut enemies: Pool<Enemy> = Pool::new();
            let mut events = Vec::new();

            let mut grounded = player_at(100.0, 100.0, true);
            melee(&mut grounded, &mut enemies, Some(&mut boss), &mut events);
            assert_eq!(boss.body.hp, boss.body.max_hp, "{:?}", kind);

            let mut airborne = player_at(100.0, 100.0, false);
            let out = melee(&mut airborne, &mut enemies, Some(&mut boss), &mut events);
            assert_eq!(out.boss_damage, MELEE_BOSS_DAMAGE);
            assert_eq!(boss.body.hp, boss.body.max_hp - MELEE_BOSS_DAMAGE, "{:?}", kind);
        }
    }

    #[test]
    fn test_aerial_upgrade_scales_boss_melee() {
        let mut p = player_at(0.0, 0.0, false);
        p.upgrades.aerial_damage = 1.3;
        assert_eq!(boss_melee_damage(&p), 18.0);
    }

    #[test]
    fn test_magic_hits_boss_only_when_caster_airborne() {
        for kind in BossKind::ALL {
            for airborne in [false, true] {
                let mut boss = Boss::new(kind, Vec2::new(300.0, 100.0));
                let mut players = vec![player_at(100.0, 100.0, !airborne)];
                let mut bullets = Pool::new();
                bullets.insert(Bullet {
                    pos: Vec2::new(300.0, 100.0),
                    vel: Vec2::ZERO,
                    life: 1.0,
                    damage: MAGIC_DAMAGE,
                    owner: BulletOwner::Player(1),
                    ricocheted: false,
                });
                let mut enemies: Pool<Enemy> = Pool::new();
                let mut events = Vec::new();
                resolve_bullet_hits(&mut bullets, &mut enemies, Some(&mut boss), &mut players, &mut events);
                let expected = if airborne { MAGIC_BOSS_DAMAGE } else { 0.0 };
                assert_eq!(boss.body.max_hp - boss.body.hp, expected, "{:?}", kind);
                assert!(bullets.get(0).unwrap().expired());
            }
        }
    }

    #[test]
    fn test_bullet_consumed_by_first_enemy() {
        let mut players = vec![player_at(0.0, 0.0, true)];
        let mut enemies = Pool::new();
        enemies.insert(Enemy::new(EnemyKind::Grunt, Vec2::new(200.0, 100.0)));
        enemies.insert(Enemy::new(EnemyKind::Grunt, Vec2::new(205.0, 100.0)));
        let mut bullets = Pool::new();
        bullets.insert(Bullet {
            pos: Vec2::new(202.0, 100.0),
            vel: Vec2::ZERO,
            life: 1.0,
            damage: MAGIC_DAMAGE,
            owner: BulletOwner::Player(1),
            ricocheted: false,
        });
        let mut events = Vec::new();
        resolve_bullet_hits(&mut bullets, &mut enemies, None, &mut players, &mut events);
        assert_eq!(enemies.get(0).unwrap().body.hp, 30.0);
        assert_eq!(enemies.get(1).unwrap().body.hp, 40.0);
        assert_eq!(players[0].combo, 1);
    }

    #[test]
    fn test_hazard_bullets_never_hit() {
        let mut players = vec![player_at(0.0, 0.0, false)];
        let mut enemies = Pool::new();
        enemies.insert(Enemy::new(EnemyKind::Grunt, Vec2::new(200.0, 100.0)));
        let mut boss = Boss::new(BossKind::ChronoWarden, Vec2::new(200.0, 100.0));
        let mut bullets = Pool::new();
        bullets.insert(Bullet::hazard(Vec2::new(200.0, 100.0), Vec2::ZERO, 1.0));
        let mut events = Vec::new();
        resolve_bullet_hits(&mut bullets, &mut enemies, Some(&mut boss), &mut players, &mut events);
        assert!(events.is_empty());
        assert_eq!(boss.body.hp, boss.body.max_hp);
        assert!(!bullets.get(0).unwrap().expired());
    }

    #[test]
    fn test_cast_magic_spread() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut p = player_at(100.0, 100.0, true);
        p.facing = -1.0;
        let mut bullets = Pool::new();
        cast_magic(&mut p, &mut bullets, &mut rng);
        let b = bullets.get(0).unwrap();
        assert!(b.vel.x < 0.0);
        assert!((b.vel.length() - MAGIC_SPEED).abs() < 0.1);
        assert!(b.vel.y.abs() <= MAGIC_SPEED * MAGIC_SPREAD.sin() + 0.1);
        assert_eq!(p.last_attack, Some(AttackKind::Magic));
    }

    #[test]
    fn test_ricochet_once_near_end_of_life() {
        let modifiers = WorldModifiers::new(ModifierConfig::default(), 0.0);
        let arena = Arena::new(800.0, 600.0);
        let mut p = player_at(0.0, 0.0, true);
        p.upgrades.ricochet = true;
        let players = vec![p];
        let mut bullets = Pool::new();
        bullets.insert(Bullet {
            pos: Vec2::new(799.0, 300.0),
            vel: Vec2::new(540.0, 0.0),
            life: 0.65,
            damage: MAGIC_DAMAGE,
            owner: BulletOwner::Player(1),
            ricocheted: false,
        });
        advance_bullets(&mut bullets, &players, &modifiers, &arena, 0.01);
        let b = bullets.get(0).unwrap();
        assert!(b.ricocheted);
        assert_eq!(b.vel.x, -540.0);

        // Already ricocheted: no second bounce
        let b = bullets.get_mut(0).unwrap();
        b.pos.x = -5.0;
        advance_bullets(&mut bullets, &players, &modifiers, &arena, 0.01);
        assert_eq!(bullets.get(0).unwrap().vel.x, -540.0);
    }

    #[test]
    fn test_no_ricochet_without_upgrade() {
        let modifiers = WorldModifiers::new(ModifierConfig::default(), 0.0);
        let arena = Arena::new(800.0, 600.0);
        let players = vec![player_at(0.0, 0.0, true)];
        let mut bullets = Pool::new();
        bullets.insert(Bullet {
            pos: Vec2::new(799.0, 300.0),
            vel: Vec2::new(540.0, 0.0),
            life: 0.65,
            damage: MAGIC_DAMAGE,
            owner: BulletOwner::Player(1),
            ricocheted: false,
        });
        advance_bullets(&mut bullets, &players, &modifiers, &arena, 0.01);
        assert!(!bullets.get(0).unwrap().ricocheted);
    }

    #[test]
    fn test_dash_consumes_charge_and_cools_down() {
        let mut p = player_at(0.0, 0.0, true);
        assert!(dash(&mut p));
        assert_eq!(p.body.vel.x, DASH_IMPULSE);
        assert_eq!(p.dash_charges, 0);
        assert!(!dash(&mut p));
        p.dash_cooldown = 0.0;
        assert!(!dash(&mut p), "no charges left");
    }

    #[test]
    fn test_retaliation_matches_last_attack() {
        let mut p = player_at(0.0, 0.0, true);
        let mut e = Enemy::new(EnemyKind::Grunt, Vec2::ZERO);
        p.combo = 4;
        p.last_attack = Some(AttackKind::Magic);
        retaliate(&mut e, &p);
        assert_eq!(e.block_magic, 0.0);
        p.combo = 5;
        retaliate(&mut e, &p);
        assert_eq!(e.block_magic, BLOCK_DURATION);
        assert_eq!(e.block_melee, 0.0);
    }

    #[test]
    fn test_contact_damage_respects_iframes_and_knocks_back() {
        let mut p = player_at(100.0, 100.0, true);
        let e = Enemy::new(EnemyKind::Brute, Vec2::new(110.0, 100.0));
        let mut events = Vec::new();
        assert!(contact_damage(&mut p, &e, &mut events));
        assert_eq!(p.body.hp, 88.0);
        assert_eq!(p.iframes, CONTACT_IFRAMES);
        assert_eq!(p.body.vel.x, -CONTACT_KNOCKBACK);
        assert!(!contact_damage(&mut p, &e, &mut events));
        assert_eq!(p.body.hp, 88.0);
    }
}
