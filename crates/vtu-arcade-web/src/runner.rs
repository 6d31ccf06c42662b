use thiserror::Error;
use vtu_arcade::{
    new_session, restore_session, ActorId, AssetError, BonusChoice, GameEvent, GameMode, InputEvent, InputQueue,
    InputSnapshot, KeyBindings, Question, QuestionBank, RenderBuffer, RenderInstance, ScoreSubmission, Session,
    SessionError, SessionPhase, SpriteRegistry, Verdict,
};

const MAX_INSTANCES: usize = 512;
const MAX_SOUNDS: usize = 32;
const MAX_EVENTS: usize = 64;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("failed to parse questions: {0}")]
    Questions(String),
}

/// Owns one session plus everything the browser host needs around it:
/// key bindings, the held-key snapshot, the question bank, sprites, and the
/// flat buffers the page reads after every tick.
///
/// The wasm exports in `lib.rs` keep one of these in a `thread_local!`,
/// because wasm-bindgen cannot export a struct holding a `Box<dyn Session>`.
pub struct SessionRunner {
    mode: GameMode,
    config_json: String,
    session: Box<dyn Session>,
    bindings: KeyBindings,
    input: InputQueue,
    held: InputSnapshot,
    questions: QuestionBank,
    sprites: SpriteRegistry,
    render_buffer: RenderBuffer,
    /// Flat buffer of sound IDs for direct memory reads.
    sound_buffer: Vec<u8>,
    event_buffer: Vec<GameEvent>,
}

impl SessionRunner {
    pub fn new(mode: GameMode, config_json: &str) -> Result<Self, RunnerError> {
        let session = new_session(mode, config_json, None)?;
        Ok(Self {
            mode,
            config_json: config_json.to_string(),
            session,
            bindings: KeyBindings::for_mode(mode),
            input: InputQueue::new(),
            held: InputSnapshot::new(),
            questions: QuestionBank::new(Vec::new(), 0),
            sprites: SpriteRegistry::new(),
            render_buffer: RenderBuffer::with_capacity(MAX_INSTANCES),
            sound_buffer: Vec::with_capacity(MAX_SOUNDS),
            event_buffer: Vec::with_capacity(MAX_EVENTS),
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    /// Replace the sprite registry. A fighting session that has not started
    /// yet is rebuilt so its animation strips pick up the manifest.
    pub fn load_manifest(&mut self, json: &str) -> Result<usize, RunnerError> {
        self.sprites = SpriteRegistry::from_json(json)?;
        if self.mode == GameMode::Fighting && self.session.phase() == SessionPhase::Intro {
            self.session = new_session(self.mode, &self.config_json, Some(&self.sprites))?;
        }
        Ok(self.sprites.len())
    }

    /// Replace the question bank. Returns how many questions are usable.
    pub fn load_questions(&mut self, json: &str, seed: u64) -> Result<usize, RunnerError> {
        self.questions = QuestionBank::from_json(json, seed).map_err(|e| RunnerError::Questions(e.to_string()))?;
        Ok(self.questions.len())
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), RunnerError> {
        self.session.start(now_ms)?;
        Ok(())
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Fold queued keys, run the session, then rebuild the render, sound
    /// and event buffers.
    pub fn tick(&mut self, now_ms: f64) {
        self.bindings.apply(&mut self.input, &mut self.held);
        self.session.tick(now_ms, &self.held, &mut self.questions);

        self.render_buffer.clear();
        self.session.render(&mut self.render_buffer, &self.sprites);

        self.sound_buffer.clear();
        for sound in self.session.drain_sounds() {
            self.sound_buffer.push(sound.0 as u8);
        }

        self.event_buffer.clear();
        self.event_buffer
            .extend(self.session.drain_events().iter().map(|e| e.to_wire()));
    }

    /// Answer the pending quiz. `None` is a timeout and counts as wrong.
    pub fn resolve_interrupt(&mut self, chosen: Option<usize>) -> Result<Verdict, RunnerError> {
        Ok(self.session.resolve_interrupt(chosen, &mut self.questions)?)
    }

    pub fn choose_bonus(&mut self, choice: BonusChoice) -> Result<(), RunnerError> {
        self.session.choose_bonus(choice)?;
        Ok(())
    }

    /// Queue the final score under `name` and hand back what the page should send.
    pub fn submit_score(&mut self, name: &str) -> Result<Vec<ScoreSubmission>, RunnerError> {
        self.session.request_score_submission(name)?;
        Ok(self.session.outbox_mut().take_pending())
    }

    pub fn snapshot(&self) -> Result<String, RunnerError> {
        Ok(self.session.to_snapshot_json()?)
    }

    /// Swap in a session restored from `snapshot`. Held keys are dropped.
    pub fn restore(&mut self, snapshot: &str) -> Result<(), RunnerError> {
        self.session = restore_session(self.mode, snapshot)?;
        self.input.drain();
        self.held = InputSnapshot::new();
        Ok(())
    }

    pub fn pending_question(&self) -> Option<&Question> {
        self.session.pending_interrupt().map(|p| &p.question)
    }

    /// 0 intro, 1 running, 2 paused for a quiz, 3 game over.
    pub fn phase_code(&self) -> u32 {
        match self.session.phase() {
            SessionPhase::Intro => 0,
            SessionPhase::Running => 1,
            SessionPhase::PausedForInterrupt => 2,
            SessionPhase::GameOver(_) => 3,
        }
    }

    pub fn score(&self) -> i64 {
        self.session.score()
    }

    pub fn health(&self, actor: ActorId) -> i32 {
        self.session.health(actor)
    }

    // ---- Pointer accessors for direct memory reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.event_buffer.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.event_buffer.len() as u32
    }

    pub fn instances(&self) -> &[RenderInstance] {
        &self.render_buffer.instances
    }

    pub fn sounds(&self) -> &[u8] {
        &self.sound_buffer
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.event_buffer
    }
}
