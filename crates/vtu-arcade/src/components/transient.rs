use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;
use crate::components::entity::Body;
use crate::core::collision::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cactus,
    Pine,
}

impl ObstacleKind {
    pub fn size(self) -> Vec2 {
        match self {
            Self::Cactus => Vec2::new(30.0, 25.0),
            Self::Pine => Vec2::new(30.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Magnet,
    Thunder,
}

impl PowerUpKind {
    pub const ALL: [Self; 3] = [Self::Shield, Self::Magnet, Self::Thunder];
}

/// Boss payload. Timers count fixed simulation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossState {
    pub health: i32,
    pub max_health: i32,
    pub steps_left: u32,
    pub bullet_countdown: u32,
    /// Steps left before shield contact can hurt it again.
    pub flash: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransientKind {
    Obstacle(ObstacleKind),
    Enemy,
    Coin,
    PowerUp(PowerUpKind),
    Thunderbolt,
    Meteor,
    Boss(BossState),
    BossBullet,
    Fireball,
}

impl TransientKind {
    pub fn size(&self) -> Vec2 {
        match self {
            Self::Obstacle(kind) => kind.size(),
            Self::Enemy | Self::Coin | Self::PowerUp(_) | Self::Meteor => Vec2::splat(40.0),
            Self::Thunderbolt => Vec2::new(10.0, 5.0),
            Self::Boss(_) => Vec2::splat(60.0),
            Self::BossBullet => Vec2::splat(20.0),
            Self::Fireball => Vec2::splat(50.0),
        }
    }

    /// Sprite key used by the render pass.
    pub fn sprite_key(&self) -> &'static str {
        match self {
            Self::Obstacle(ObstacleKind::Cactus) => "runner/cactus",
            Self::Obstacle(ObstacleKind::Pine) => "runner/pine",
            Self::Enemy => "runner/enemy",
            Self::Coin => "runner/coin",
            Self::PowerUp(PowerUpKind::Shield) => "runner/shield",
            Self::PowerUp(PowerUpKind::Magnet) => "runner/magnet",
            Self::PowerUp(PowerUpKind::Thunder) => "runner/thunder",
            Self::Thunderbolt => "runner/thunderbolt",
            Self::Meteor => "runner/meteor",
            Self::Boss(_) => "runner/boss",
            Self::BossBullet => "runner/bullet",
            Self::Fireball => "fight/fireball",
        }
    }

    /// Ground-level hazards that scroll with the world and can raise a quiz.
    pub fn scrolls(&self) -> bool {
        matches!(self, Self::Obstacle(_) | Self::Enemy | Self::Coin | Self::PowerUp(_))
    }
}

/// Short-lived world object owned by a session's scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientEntity {
    pub id: EntityId,
    pub kind: TransientKind,
    pub body: Body,
    /// One-shot gate for quiz interrupts.
    pub triggered: bool,
}

impl TransientEntity {
    pub fn new(id: EntityId, kind: TransientKind, pos: Vec2) -> Self {
        Self {
            id,
            body: Body::new(kind.size()).with_pos(pos),
            kind,
            triggered: false,
        }
    }

    pub fn with_vel(mut self, vel: Vec2) -> Self {
        self.body.vel = vel;
        self
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_body(&self.body)
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, TransientKind::Boss(_))
    }

    pub fn boss_mut(&mut self) -> Option<&mut BossState> {
        match &mut self.kind {
            TransientKind::Boss(state) => Some(state),
            _ => None,
        }
    }

    /// Integrate velocity without gravity.
    pub fn advance(&mut self, dt: f32) {
        self.body.pos += self.body.vel * dt;
    }
}
