use serde::{Deserialize, Serialize};

use crate::api::types::ActorId;

/// Logical controls. The runner reads `Jump` and uses `Attack` to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
    Attack,
    Special,
}

/// Set of held actions for both actors, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    bits: u16,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    fn bit(actor: ActorId, action: Action) -> u16 {
        let base = match actor {
            ActorId::Player => 0,
            ActorId::Opponent => 8,
        };
        1 << (base + action as u16)
    }

    pub fn with(mut self, actor: ActorId, action: Action) -> Self {
        self.press(actor, action);
        self
    }

    pub fn press(&mut self, actor: ActorId, action: Action) {
        self.bits |= Self::bit(actor, action);
    }

    pub fn release(&mut self, actor: ActorId, action: Action) {
        self.bits &= !Self::bit(actor, action);
    }

    pub fn held(&self, actor: ActorId, action: Action) -> bool {
        self.bits & Self::bit(actor, action) != 0
    }

    /// Held now but not in `prev`.
    pub fn just_pressed(&self, prev: &InputSnapshot, actor: ActorId, action: Action) -> bool {
        self.held(actor, action) && !prev.held(actor, action)
    }

    /// -1, 0 or 1 along x. Opposing directions cancel.
    pub fn axis(&self, actor: ActorId) -> f32 {
        match (self.held(actor, Action::Left), self.held(actor, Action::Right)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actors_do_not_share_bits() {
        let input = InputSnapshot::new().with(ActorId::Player, Action::Jump);
        assert!(input.held(ActorId::Player, Action::Jump));
        assert!(!input.held(ActorId::Opponent, Action::Jump));
    }

    #[test]
    fn edge_detection() {
        let prev = InputSnapshot::new().with(ActorId::Player, Action::Attack);
        let now = prev.with(ActorId::Player, Action::Jump);
        assert!(now.just_pressed(&prev, ActorId::Player, Action::Jump));
        assert!(!now.just_pressed(&prev, ActorId::Player, Action::Attack));
    }

    #[test]
    fn opposing_directions_cancel() {
        let mut input = InputSnapshot::new()
            .with(ActorId::Opponent, Action::Left)
            .with(ActorId::Opponent, Action::Right);
        assert_eq!(input.axis(ActorId::Opponent), 0.0);
        input.release(ActorId::Opponent, Action::Right);
        assert_eq!(input.axis(ActorId::Opponent), -1.0);
    }
}
