//! State and lifecycle shared by both sessions: phase machine, simulation
//! clock, interrupt bookkeeping and the score outbox.

use serde::{Deserialize, Serialize};

use crate::api::game::{PendingInterrupt, SessionContext};
use crate::api::types::{InterruptSource, Outcome, SessionEvent, SessionPhase, SoundEvent};
use crate::bridge::external::ExternalBridge;
use crate::bridge::outbox::{ScoreOutbox, ScoreSubmission};
use crate::core::rng::Rng;
use crate::core::time::FixedTimestep;
use crate::error::{Result, SessionError};
use crate::input::snapshot::InputSnapshot;

/// Whether the tick loop may run another fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    Continue,
    /// Paused or finished during this step.
    Halt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCore {
    phase: SessionPhase,
    /// Simulation clock in ms. Advances only by fixed steps.
    now_ms: f64,
    last_host_ms: Option<f64>,
    pub timestep: FixedTimestep,
    pub ctx: SessionContext,
    pub rng: Rng,
    pending: Option<PendingInterrupt>,
    /// Input seen by the previous step, for edge-triggered actions.
    pub prev_input: InputSnapshot,
    submitted: bool,
    #[serde(skip)]
    outbox: ScoreOutbox,
}

impl SessionCore {
    pub fn new(fixed_dt: f32, seed: u64) -> Self {
        Self {
            phase: SessionPhase::Intro,
            now_ms: 0.0,
            last_host_ms: None,
            timestep: FixedTimestep::new(fixed_dt),
            ctx: SessionContext::new(),
            rng: Rng::new(seed),
            pending: None,
            prev_input: InputSnapshot::new(),
            submitted: false,
            outbox: ScoreOutbox::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn step_ms(&self) -> f64 {
        self.timestep.dt() as f64 * 1000.0
    }

    pub fn start(&mut self, now_ms: f64) -> Result<()> {
        if self.phase != SessionPhase::Intro {
            return Err(SessionError::AlreadyStarted);
        }
        self.last_host_ms = Some(now_ms);
        self.timestep.reset();
        self.set_phase(SessionPhase::Running);
        Ok(())
    }

    pub fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase == phase {
            return;
        }
        log::info!("session phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.ctx.emit_event(SessionEvent::PhaseChanged(phase));
    }

    pub fn finish(&mut self, outcome: Outcome) {
        if self.phase.is_terminal() {
            return;
        }
        self.pending = None;
        self.set_phase(SessionPhase::GameOver(outcome));
    }

    /// Seconds of host time since the previous call. The first call after
    /// construction or restore yields zero.
    pub fn frame_dt(&mut self, now_ms: f64) -> f32 {
        let dt = self.last_host_ms.map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_host_ms = Some(now_ms);
        (dt / 1000.0) as f32
    }

    /// Move the simulation clock forward by one fixed step.
    pub fn advance_clock(&mut self) -> f64 {
        self.now_ms += self.step_ms();
        self.now_ms
    }

    /// Ask the bridge for a question and pause on it. Returns false, leaving
    /// the session running, when no question is available.
    pub fn open_interrupt(&mut self, source: InterruptSource, bridge: &mut dyn ExternalBridge) -> bool {
        let Some(question) = bridge.random_question() else {
            log::info!("no question available; skipping interrupt from {:?}", source);
            return false;
        };
        self.pending = Some(PendingInterrupt { source, question });
        self.ctx.emit_sound(SoundEvent::QUESTION);
        self.ctx.emit_event(SessionEvent::InterruptOpened(source));
        self.set_phase(SessionPhase::PausedForInterrupt);
        true
    }

    pub fn pending(&self) -> Option<&PendingInterrupt> {
        self.pending.as_ref()
    }

    /// Remove the pending interrupt for resolution.
    pub fn take_pending(&mut self) -> Result<PendingInterrupt> {
        if self.phase != SessionPhase::PausedForInterrupt {
            return Err(SessionError::NoPendingInterrupt);
        }
        self.pending.take().ok_or(SessionError::NoPendingInterrupt)
    }

    /// Resume after an interrupt. Drops the partial step so the pause does
    /// not turn into a burst of catch-up steps.
    pub fn resume(&mut self) {
        self.timestep.reset();
        self.set_phase(SessionPhase::Running);
    }

    pub fn submit_score(&mut self, name: &str, score: i64, difficulty: &str, mode: &str) -> Result<()> {
        if !self.phase.is_terminal() {
            return Err(SessionError::NotFinished);
        }
        if self.submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        self.submitted = true;
        log::info!("queueing {} score {} for {}", mode, score, name);
        self.outbox.push(ScoreSubmission {
            name: name.to_string(),
            score,
            difficulty: difficulty.to_string(),
            mode: mode.to_string(),
        });
        Ok(())
    }

    pub fn outbox_mut(&mut self) -> &mut ScoreOutbox {
        &mut self.outbox
    }
}
