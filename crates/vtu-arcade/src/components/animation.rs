//! Discrete animation states and the frame/transition rules between them.
//!
//! A machine holds one `(state, frame)` pair. Requests to change state go
//! through [`AnimationStateMachine::request_state`], which enforces that
//! `death` is terminal and `takeHit` cannot be interrupted before its last
//! frame. Frame advancement never changes the state; state changes that
//! depend on reaching a last frame are session policy (see
//! `systems::animation`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimState {
    Idle,
    Run,
    Jump,
    Fall,
    Attack,
    TakeHit,
    Death,
    SpecialAttack,
}

impl AnimState {
    pub const ALL: [Self; 8] = [
        Self::Idle,
        Self::Run,
        Self::Jump,
        Self::Fall,
        Self::Attack,
        Self::TakeHit,
        Self::Death,
        Self::SpecialAttack,
    ];

    /// Name used for sprite lookup keys (`"<actor>/<state>"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Jump => "jump",
            Self::Fall => "fall",
            Self::Attack => "attack",
            Self::TakeHit => "takeHit",
            Self::Death => "death",
            Self::SpecialAttack => "specialAttack",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Frame count and per-frame duration of one sprite strip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    pub frame_count: u32,
    pub frame_duration_ms: f64,
}

impl SpriteDescriptor {
    pub fn new(frame_count: u32, frame_duration_ms: f64) -> Self {
        Self {
            frame_count,
            frame_duration_ms,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.frame_count > 0 && self.frame_duration_ms > 0.0
    }
}

/// One descriptor per [`AnimState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationSet {
    descriptors: [SpriteDescriptor; 8],
}

impl AnimationSet {
    /// Build from frame counts in [`AnimState::ALL`] order, all at one frame rate.
    pub fn from_counts(counts: [u32; 8], frame_duration_ms: f64) -> Self {
        Self {
            descriptors: counts.map(|n| SpriteDescriptor::new(n, frame_duration_ms)),
        }
    }

    pub fn get(&self, state: AnimState) -> SpriteDescriptor {
        self.descriptors[state.index()]
    }

    pub fn set(&mut self, state: AnimState, desc: SpriteDescriptor) {
        self.descriptors[state.index()] = desc;
    }

    /// The first state whose descriptor cannot drive an animation.
    pub fn first_invalid(&self) -> Option<AnimState> {
        AnimState::ALL.into_iter().find(|s| !self.get(*s).is_valid())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationStateMachine {
    set: AnimationSet,
    current: AnimState,
    frame: u32,
    last_frame_ms: f64,
}

impl AnimationStateMachine {
    /// Start in `idle` at frame 0. The set must have been validated.
    pub fn new(set: AnimationSet, now_ms: f64) -> Self {
        Self {
            set,
            current: AnimState::Idle,
            frame: 0,
            last_frame_ms: now_ms,
        }
    }

    pub fn current(&self) -> AnimState {
        self.current
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn descriptor(&self) -> SpriteDescriptor {
        self.set.get(self.current)
    }

    pub fn set(&self) -> &AnimationSet {
        &self.set
    }

    pub fn is_last_frame(&self) -> bool {
        self.frame + 1 >= self.descriptor().frame_count
    }

    /// Ask to switch to `next`. Returns whether the request was accepted.
    ///
    /// `Death` refuses every request, itself included, and so does `TakeHit`
    /// until its last frame. Otherwise a same-state request is accepted
    /// without resetting the frame.
    pub fn request_state(&mut self, next: AnimState, now_ms: f64) -> bool {
        match self.current {
            AnimState::Death => return false,
            AnimState::TakeHit if !self.is_last_frame() => return false,
            _ => {}
        }
        if self.current == next {
            return true;
        }
        self.current = next;
        self.frame = 0;
        self.last_frame_ms = now_ms;
        true
    }

    /// Restart the current strip from frame 0.
    pub fn rewind(&mut self, now_ms: f64) {
        self.frame = 0;
        self.last_frame_ms = now_ms;
    }

    /// Step the frame counter once its duration has elapsed. Returns true if
    /// the frame changed. Wraps to 0 after the last frame.
    pub fn advance_frame(&mut self, now_ms: f64) -> bool {
        let desc = self.descriptor();
        if now_ms - self.last_frame_ms < desc.frame_duration_ms {
            return false;
        }
        self.frame = (self.frame + 1) % desc.frame_count.max(1);
        self.last_frame_ms = now_ms;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> AnimationStateMachine {
        AnimationStateMachine::new(AnimationSet::from_counts([8, 8, 2, 2, 6, 4, 6, 6], 100.0), 0.0)
    }

    #[test]
    fn frame_advances_on_duration_and_wraps() {
        let mut m = machine();
        assert!(!m.advance_frame(50.0));
        assert!(m.advance_frame(100.0));
        assert_eq!(m.frame(), 1);
        let mut now = 100.0;
        for _ in 0..7 {
            now += 100.0;
            m.advance_frame(now);
        }
        assert_eq!(m.frame(), 0);
        assert_eq!(m.current(), AnimState::Idle);
    }

    #[test]
    fn death_rejects_everything() {
        let mut m = machine();
        assert!(m.request_state(AnimState::Death, 0.0));
        for state in AnimState::ALL {
            assert!(!m.request_state(state, 10.0));
            assert_eq!(m.current(), AnimState::Death);
        }
    }

    #[test]
    fn take_hit_holds_until_last_frame() {
        let mut m = machine();
        assert!(m.request_state(AnimState::TakeHit, 0.0));
        assert!(!m.request_state(AnimState::Idle, 0.0));
        assert!(!m.request_state(AnimState::TakeHit, 50.0));
        let mut now = 0.0;
        while !m.is_last_frame() {
            now += 100.0;
            m.advance_frame(now);
        }
        assert_eq!(m.frame(), 3);
        assert!(m.request_state(AnimState::Run, now));
        assert_eq!(m.current(), AnimState::Run);
        assert_eq!(m.frame(), 0);
    }

    #[test]
    fn same_state_does_not_reset() {
        let mut m = machine();
        m.request_state(AnimState::Run, 0.0);
        m.advance_frame(100.0);
        assert!(m.request_state(AnimState::Run, 150.0));
        assert_eq!(m.frame(), 1);
    }

    #[test]
    fn state_names_round_trip() {
        for state in AnimState::ALL {
            assert_eq!(AnimState::from_name(state.name()), Some(state));
        }
        assert_eq!(AnimState::from_name("dance"), None);
    }
}
