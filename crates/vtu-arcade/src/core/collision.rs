use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Facing;
use crate::components::animation::AnimState;
use crate::components::entity::Body;
use crate::components::fighter::Fighter;

/// Axis-aligned box: top-left `min` plus `size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_body(body: &Body) -> Self {
        Self {
            min: body.pos,
            size: body.size,
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Open-interval overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let (a1, a2) = (self.min, self.max());
        let (b1, b2) = (other.min, other.max());
        a1.x < b2.x && a2.x > b1.x && a1.y < b2.y && a2.y > b1.y
    }
}

/// Proximity test for quiz triggers: |x - target| <= tolerance.
pub fn within_band(x: f32, target: f32, tolerance: f32) -> bool {
    (x - target).abs() <= tolerance
}

/// Result of checking one attacker against one defender for this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackResolution {
    /// Not attacking, or not yet on the impact frame.
    Pending,
    /// The hit lands.
    Connect,
    /// Impact frame reached with nothing in range: the attack is spent.
    Cancel,
    /// In range but facing away: no damage, the swing plays out.
    Discard,
}

/// Whether `attacker` faces `defender` along x.
pub fn faces(attacker: &Fighter, defender: &Fighter) -> bool {
    match attacker.facing {
        Some(Facing::Right) => attacker.body.pos.x < defender.body.pos.x,
        Some(Facing::Left) => attacker.body.pos.x > defender.body.pos.x,
        None => false,
    }
}

pub fn resolve_attack(attacker: &Fighter, defender: &Fighter) -> AttackResolution {
    if !attacker.attacking || attacker.anim.current() != AnimState::Attack {
        return AttackResolution::Pending;
    }
    if attacker.anim.frame() != attacker.impact_frame {
        return AttackResolution::Pending;
    }
    if !attacker.attack_box().intersects(&defender.hurt_box()) {
        return AttackResolution::Cancel;
    }
    if faces(attacker, defender) {
        AttackResolution::Connect
    } else {
        AttackResolution::Discard
    }
}
