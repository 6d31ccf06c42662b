//! Minimal platformer integration: gravity, ground clamp, scene clamp.

use crate::components::entity::Body;

/// Horizontal extent a body's box must stay within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
}

impl Bounds {
    pub fn new(min_x: f32, max_x: f32) -> Self {
        Self { min_x, max_x }
    }

    /// Unbounded horizontally.
    pub fn open() -> Self {
        Self {
            min_x: f32::NEG_INFINITY,
            max_x: f32::INFINITY,
        }
    }
}

/// Advance one body by `dt` seconds.
///
/// `ground_y` is the resting y of the body's top edge. After the call
/// `pos.y <= ground_y` and `on_ground == (pos.y == ground_y)`.
pub fn physics_step(body: &mut Body, dt: f32, ground_y: f32, gravity: f32, bounds: Bounds) {
    body.vel.y += gravity * dt;
    body.pos += body.vel * dt;

    if body.pos.y >= ground_y {
        body.pos.y = ground_y;
        if body.vel.y > 0.0 {
            body.vel.y = 0.0;
        }
        body.on_ground = true;
    } else {
        body.on_ground = false;
    }

    let max_left = (bounds.max_x - body.size.x).max(bounds.min_x);
    body.pos.x = body.pos.x.clamp(bounds.min_x, max_left);
}

/// Apply an upward launch if the body is grounded. Returns whether it jumped.
pub fn try_jump(body: &mut Body, jump_velocity: f32) -> bool {
    if !body.on_ground {
        return false;
    }
    body.vel.y = jump_velocity;
    body.on_ground = false;
    true
}
