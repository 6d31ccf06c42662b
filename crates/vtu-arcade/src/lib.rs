pub mod api;
pub mod assets;
pub mod bridge;
pub mod components;
pub mod core;
pub mod error;
pub mod input;
pub mod renderer;
pub mod session;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{FightConfig, FighterProfile, RunnerConfig};
pub use api::game::{PendingInterrupt, Session, SessionContext};
pub use api::types::{
    ActorId, BonusChoice, EntityId, Facing, GameEvent, GameMode, InterruptSource, Outcome, SessionEvent,
    SessionPhase, SoundEvent, Weather,
};
pub use assets::manifest::AssetManifest;
pub use assets::registry::{SpriteRegistry, SpriteSource};
pub use bridge::external::{ExternalBridge, NoQuestions, Question, Verdict};
pub use bridge::outbox::{OutboxWorker, ScoreOutbox, ScoreSink, ScoreSubmission};
pub use bridge::questions::QuestionBank;
pub use components::animation::{AnimState, AnimationSet, AnimationStateMachine, SpriteDescriptor};
pub use core::time::FixedTimestep;
pub use error::{AssetError, SessionError, SinkError};
pub use input::bindings::KeyBindings;
pub use input::queue::{InputEvent, InputQueue};
pub use input::snapshot::{Action, InputSnapshot};
pub use renderer::instance::{RenderBuffer, RenderInstance};
pub use session::{new_session, restore_session, FightSession, RunnerSession};
