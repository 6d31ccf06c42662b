use serde::{Deserialize, Serialize};

use crate::api::types::{
    ActorId, BonusChoice, EntityId, GameMode, InterruptSource, Outcome, SessionEvent, SessionPhase, SoundEvent,
};
use crate::assets::registry::SpriteRegistry;
use crate::bridge::external::{ExternalBridge, Question, Verdict};
use crate::bridge::outbox::ScoreOutbox;
use crate::error::{Result, SessionError};
use crate::input::snapshot::InputSnapshot;
use crate::renderer::instance::RenderBuffer;

/// Per-session id allocator plus the per-tick event and sound queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    next_id: u32,
    #[serde(skip)]
    events: Vec<SessionEvent>,
    #[serde(skip)]
    sounds: Vec<SoundEvent>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            events: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    pub fn emit_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }
}

/// A quiz waiting for an answer. The session stays frozen until it is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInterrupt {
    pub source: InterruptSource,
    pub question: Question,
}

/// The contract both mini-games fulfill. Object safe so hosts can hold a
/// `Box<dyn Session>` picked at runtime.
pub trait Session {
    fn mode(&self) -> GameMode;

    /// Leave the intro. Fails if the session was already started.
    fn start(&mut self, now_ms: f64) -> Result<()>;

    /// Advance to host time `now_ms`. Never fails; a paused or finished
    /// session only advances its ambient decorations.
    fn tick(&mut self, now_ms: f64, input: &InputSnapshot, bridge: &mut dyn ExternalBridge);

    fn phase(&self) -> SessionPhase;

    fn outcome(&self) -> Option<Outcome> {
        match self.phase() {
            SessionPhase::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn is_game_over(&self) -> bool {
        self.phase().is_terminal()
    }

    fn score(&self) -> i64;

    /// Fighter health, or remaining lives for the runner's player.
    fn health(&self, actor: ActorId) -> i32;

    fn pending_interrupt(&self) -> Option<&PendingInterrupt>;

    /// Judge `chosen` with the bridge, apply the reward or penalty and resume.
    fn resolve_interrupt(&mut self, chosen: Option<usize>, bridge: &mut dyn ExternalBridge) -> Result<Verdict>;

    /// Pick the reward for a correct bonus answer. Only the fighting game
    /// offers one.
    fn choose_bonus(&mut self, _choice: BonusChoice) -> Result<()> {
        Err(SessionError::NoBonusPending)
    }

    /// Rebuild the render buffer from current state.
    fn render(&self, buffer: &mut RenderBuffer, sprites: &SpriteRegistry);

    fn drain_events(&mut self) -> Vec<SessionEvent>;

    fn drain_sounds(&mut self) -> Vec<SoundEvent>;

    /// Queue the final score. Allowed once, after the game is over.
    fn request_score_submission(&mut self, name: &str) -> Result<()>;

    fn outbox_mut(&mut self) -> &mut ScoreOutbox;

    fn to_snapshot_json(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ctx = SessionContext::new();
        let a = ctx.next_id();
        let b = ctx.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn drain_empties_queues() {
        let mut ctx = SessionContext::new();
        ctx.emit_sound(SoundEvent::COIN);
        ctx.emit_event(SessionEvent::ScoreChanged { score: 3 });
        assert_eq!(ctx.drain_sounds(), vec![SoundEvent::COIN]);
        assert_eq!(ctx.drain_events().len(), 1);
        assert!(ctx.drain_events().is_empty());
    }

    #[test]
    fn snapshot_keeps_id_counter_only() {
        let mut ctx = SessionContext::new();
        ctx.next_id();
        ctx.emit_sound(SoundEvent::HIT);
        let json = serde_json::to_string(&ctx).unwrap();
        let mut back: SessionContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back.next_id(), EntityId(2));
        assert!(back.drain_sounds().is_empty());
    }
}
