//! Append-only score outbox and the detached worker that drains it.
//!
//! Sessions only append. Delivery happens off the simulation thread through a
//! [`ScoreSink`]; dropping the session or the worker handle never cancels a
//! submission that was already handed off.

use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Sender};
use serde::{Deserialize, Serialize};

use crate::error::SinkError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: i64,
    pub difficulty: String,
    pub mode: String,
}

/// Leaderboard endpoint. Called from the worker thread.
pub trait ScoreSink: Send + 'static {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), SinkError>;
}

impl<F> ScoreSink for F
where
    F: FnMut(&ScoreSubmission) -> Result<(), SinkError> + Send + 'static,
{
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), SinkError> {
        self(submission)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreOutbox {
    entries: Vec<ScoreSubmission>,
    /// Entries before this index have been handed off.
    cursor: usize,
}

impl ScoreOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, submission: ScoreSubmission) {
        self.entries.push(submission);
    }

    /// Entries not yet handed off.
    pub fn pending(&self) -> &[ScoreSubmission] {
        &self.entries[self.cursor..]
    }

    /// Copy out pending entries and mark them handed off. History is kept.
    pub fn take_pending(&mut self) -> Vec<ScoreSubmission> {
        let out = self.pending().to_vec();
        self.cursor = self.entries.len();
        out
    }

    /// Everything ever submitted, in order.
    pub fn history(&self) -> &[ScoreSubmission] {
        &self.entries
    }
}

/// Background thread that forwards submissions to a sink.
pub struct OutboxWorker {
    tx: Sender<ScoreSubmission>,
    handle: JoinHandle<()>,
}

impl OutboxWorker {
    pub fn spawn(mut sink: impl ScoreSink) -> Self {
        let (tx, rx) = unbounded::<ScoreSubmission>();
        let handle = std::thread::spawn(move || {
            for submission in rx.iter() {
                match sink.submit(&submission) {
                    Ok(()) => log::info!("score submitted for {} ({})", submission.name, submission.score),
                    Err(e) => log::warn!("dropping score for {}: {}", submission.name, e),
                }
            }
        });
        Self { tx, handle }
    }

    /// Hand every pending entry to the worker. Returns how many were sent.
    pub fn forward(&self, outbox: &mut ScoreOutbox) -> usize {
        let mut sent = 0;
        for submission in outbox.take_pending() {
            // Send only fails once the worker has exited.
            if self.tx.send(submission).is_err() {
                log::warn!("outbox worker has stopped; submission lost");
            } else {
                sent += 1;
            }
        }
        sent
    }

    /// Close the channel and wait for queued submissions to finish.
    pub fn shutdown(self) {
        let Self { tx, handle } = self;
        drop(tx);
        let _ = handle.join();
    }
}
