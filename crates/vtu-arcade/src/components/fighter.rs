use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::FighterProfile;
use crate::api::types::Facing;
use crate::components::animation::{AnimState, AnimationStateMachine};
use crate::components::entity::Body;
use crate::core::collision::Aabb;

pub const DEFAULT_MAX_HEALTH: i32 = 100;

/// A fighting-game actor: a body plus combat state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub body: Body,
    pub anim: AnimationStateMachine,
    /// Clamped to [0, max_health].
    pub health: i32,
    pub max_health: i32,
    pub attacking: bool,
    pub dead: bool,
    pub death_finished: bool,
    pub special_charged: bool,
    /// Last horizontal direction moved. `None` until the fighter first moves.
    pub facing: Option<Facing>,
    pub attack_offset: Vec2,
    pub attack_size: Vec2,
    pub impact_frame: u32,
    /// Sim time at which the no-input streak began, for the idle debounce.
    pub idle_since_ms: Option<f64>,
}

impl Fighter {
    pub fn new(profile: &FighterProfile, pos: Vec2) -> Self {
        Self {
            body: Body::new(profile.size).with_pos(pos),
            anim: AnimationStateMachine::new(profile.animations, 0.0),
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            attacking: false,
            dead: false,
            death_finished: false,
            special_charged: false,
            facing: None,
            attack_offset: profile.attack_offset,
            attack_size: profile.attack_size,
            impact_frame: profile.impact_frame,
            idle_since_ms: None,
        }
    }

    /// Set the health cap and start at full health.
    pub fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self.health = max_health;
        self
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health.clamp(0, self.max_health);
        self
    }

    pub fn hurt_box(&self) -> Aabb {
        Aabb::from_body(&self.body)
    }

    /// Attack box in world space. Not mirrored by facing.
    pub fn attack_box(&self) -> Aabb {
        Aabb {
            min: self.body.pos + self.attack_offset,
            size: self.attack_size,
        }
    }

    /// Dead with the death strip played out: no more physics or animation.
    pub fn is_frozen(&self) -> bool {
        self.dead && self.death_finished
    }

    /// Busy states that locomotion must not override.
    pub fn is_busy(&self) -> bool {
        self.attacking || self.anim.current() == AnimState::SpecialAttack
    }

    /// Start a swing from frame 0. Ignored while a swing is in progress or
    /// when the animation machine refuses the state.
    pub fn attack(&mut self, now_ms: f64) -> bool {
        if self.attacking || self.dead {
            return false;
        }
        if self.anim.current() == AnimState::Attack {
            self.anim.rewind(now_ms);
        }
        if !self.anim.request_state(AnimState::Attack, now_ms) {
            return false;
        }
        self.attacking = true;
        true
    }

    /// Apply damage. Returns the health actually removed.
    pub fn take_hit(&mut self, damage: i32, now_ms: f64) -> i32 {
        let before = self.health;
        self.health = (self.health - damage).clamp(0, self.max_health);
        if self.health == 0 {
            self.dead = true;
            self.attacking = false;
            // Refused while a takeHit strip is still playing; the animation
            // policy moves to death once that strip ends.
            self.anim.request_state(AnimState::Death, now_ms);
        } else {
            self.anim.request_state(AnimState::TakeHit, now_ms);
            if self.anim.current() == AnimState::TakeHit {
                self.attacking = false;
            }
        }
        before - self.health
    }

    pub fn heal(&mut self, amount: i32) {
        if !self.dead {
            self.health = (self.health + amount).clamp(0, self.max_health);
        }
    }
}
