use std::collections::HashMap;

use crate::api::types::{ActorId, GameMode};
use crate::input::queue::{InputEvent, InputQueue};
use crate::input::snapshot::{Action, InputSnapshot};

/// DOM `keyCode` values used by the default layouts.
pub mod keys {
    pub const SHIFT: u32 = 16;
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const F: u32 = 70;
    pub const Q: u32 = 81;
    pub const W: u32 = 87;
}

/// Maps key codes to `(actor, action)` pairs.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: HashMap<u32, (ActorId, Action)>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Fighting => Self::fighting(),
            GameMode::Runner => Self::runner(),
        }
    }

    /// Player on WASD + space/Q, opponent on arrows + shift.
    pub fn fighting() -> Self {
        Self::new()
            .bind(keys::A, ActorId::Player, Action::Left)
            .bind(keys::D, ActorId::Player, Action::Right)
            .bind(keys::W, ActorId::Player, Action::Jump)
            .bind(keys::SPACE, ActorId::Player, Action::Attack)
            .bind(keys::Q, ActorId::Player, Action::Special)
            .bind(keys::LEFT, ActorId::Opponent, Action::Left)
            .bind(keys::RIGHT, ActorId::Opponent, Action::Right)
            .bind(keys::UP, ActorId::Opponent, Action::Jump)
            .bind(keys::DOWN, ActorId::Opponent, Action::Attack)
            .bind(keys::SHIFT, ActorId::Opponent, Action::Special)
    }

    /// Space or up to jump, F to fire a thunderbolt.
    pub fn runner() -> Self {
        Self::new()
            .bind(keys::SPACE, ActorId::Player, Action::Jump)
            .bind(keys::UP, ActorId::Player, Action::Jump)
            .bind(keys::F, ActorId::Player, Action::Attack)
    }

    pub fn bind(mut self, key_code: u32, actor: ActorId, action: Action) -> Self {
        self.map.insert(key_code, (actor, action));
        self
    }

    pub fn lookup(&self, key_code: u32) -> Option<(ActorId, Action)> {
        self.map.get(&key_code).copied()
    }

    /// Fold queued key events into `snapshot`. Unbound keys are ignored.
    pub fn apply(&self, queue: &mut InputQueue, snapshot: &mut InputSnapshot) {
        for event in queue.drain() {
            match event {
                InputEvent::KeyDown { key_code } => {
                    if let Some((actor, action)) = self.lookup(key_code) {
                        snapshot.press(actor, action);
                    }
                }
                InputEvent::KeyUp { key_code } => {
                    if let Some((actor, action)) = self.lookup(key_code) {
                        snapshot.release(actor, action);
                    }
                }
                InputEvent::ReleaseAll => *snapshot = InputSnapshot::new(),
            }
        }
    }
}
