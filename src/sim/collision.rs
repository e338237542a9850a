//! Axis-separated collision resolution against the platform set
//!
//! Movement is integrated one axis at a time (X, then Y) and each axis is
//! re-tested against every live platform. This is move-then-clamp, not a
//! swept test: stacked platforms resolve in list order, predictably.
//!
//! The vertical pass is gravity-direction aware. "Landing" means moving in the
//! same direction as gravity, so the landing edge and the ceiling edge swap
//! when gravity inverts and the same code serves both orientations.

use glam::Vec2;

use super::entity::Body;
use super::platform::Platform;
use super::state::Arena;
use crate::consts::*;

/// What kind of body is being resolved (controls occupancy and void rules)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Players mark platforms occupied and respawn from the void
    Player,
    /// Enemies and bosses die in the void
    Npc,
}

/// Result of a resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Index of the last platform landed on this pass
    pub landed_on: Option<usize>,
    /// A horizontal contact zeroed `vel.x`
    pub hit_wall: bool,
    /// A ceiling contact zeroed `vel.y`
    pub hit_ceiling: bool,
    /// The body left the arena and the void rule was applied
    pub lost_to_void: bool,
}

/// Integrate `body` by its velocity and resolve against live platforms
pub fn resolve(
    body: &mut Body,
    platforms: &mut [Platform],
    gravity_dir: f32,
    arena: &Arena,
    kind: BodyKind,
    dt: f32,
) -> Resolution {
    let mut out = Resolution::default();
    body.on_ground = false;

    // --- X AXIS ---
    body.pos.x += body.vel.x * dt;
    for platform in platforms.iter() {
        let Some(pr) = platform.solid_rect() else {
            continue;
        };
        if body.rect().overlaps(&pr) {
            body.pos.x = if body.vel.x > 0.0 {
                pr.left() - body.half.x
            } else {
                pr.right() + body.half.x
            };
            body.vel.x = 0.0;
            out.hit_wall = true;
        }
    }

    // --- Y AXIS ---
    body.pos.y += body.vel.y * dt;
    for (index, platform) in platforms.iter_mut().enumerate() {
        let Some(pr) = platform.solid_rect() else {
            continue;
        };
        if !body.rect().overlaps(&pr) {
            continue;
        }
        if body.vel.y * gravity_dir > 0.0 {
            // Moving with gravity: land on the surface facing against it
            body.pos.y = if gravity_dir > 0.0 {
                pr.top() - body.half.y
            } else {
                pr.bottom() + body.half.y
            };
            body.vel.y = 0.0;
            body.on_ground = true;
            if kind == BodyKind::Player {
                platform.occupied = true;
            }
            out.landed_on = Some(index);
        } else {
            // Moving against gravity (or resting): bump the underside
            body.pos.y = if gravity_dir > 0.0 {
                pr.bottom() + body.half.y
            } else {
                pr.top() - body.half.y
            };
            body.vel.y = 0.0;
            out.hit_ceiling = true;
        }
    }

    body.pos.x = body
        .pos
        .x
        .clamp(ARENA_SIDE_MARGIN, (arena.width - ARENA_SIDE_MARGIN).max(ARENA_SIDE_MARGIN));

    if arena.is_void(body.pos.y) {
        out.lost_to_void = true;
        match kind {
            BodyKind::Player => {
                body.take_damage(VOID_DAMAGE);
                body.pos = arena.respawn_point();
                body.vel = Vec2::ZERO;
            }
            BodyKind::Npc => {
                body.hp = body.hp.min(0.0);
            }
        }
    }

    out
}
