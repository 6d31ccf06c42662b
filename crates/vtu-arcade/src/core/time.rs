use serde::{Deserialize, Serialize};

/// Fixed timestep accumulator.
/// Converts host frame times into a whole number of simulation steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedTimestep {
    /// The fixed delta time per step.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Drop any partial step, e.g. after resuming from a pause.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// One-shot deadline on the simulation clock that can be restarted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeout {
    deadline_ms: Option<f64>,
}

impl Timeout {
    /// (Re)arm the deadline `duration_ms` after `now_ms`.
    pub fn start(&mut self, now_ms: f64, duration_ms: f64) {
        self.deadline_ms = Some(now_ms + duration_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Returns true exactly once when the deadline has passed, then disarms.
    pub fn expired(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        self.deadline_ms.map_or(0.0, |d| (d - now_ms).max(0.0))
    }
}

/// Match countdown. Only advanced while the session is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    total_ms: f64,
    elapsed_ms: f64,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            total_ms: seconds as f64 * 1000.0,
            elapsed_ms: 0.0,
        }
    }

    pub fn advance(&mut self, dt_ms: f64) {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.total_ms);
    }

    /// Whole seconds left, as shown on the match clock.
    pub fn remaining_secs(&self) -> u32 {
        ((self.total_ms - self.elapsed_ms) / 1000.0).ceil().max(0.0) as u32
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed_ms >= self.total_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0 / 60.0);
        assert_eq!(steps, 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(0.008);
        assert_eq!(steps, 0);
        let steps = ts.accumulate(0.010);
        assert_eq!(steps, 1);
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut ts = FixedTimestep::new(1.0 / 30.0);
        assert_eq!(ts.accumulate(1.0), 10);
        assert_eq!(ts.accumulate(-5.0), 0);
    }

    #[test]
    fn timeout_restart_pushes_deadline() {
        let mut t = Timeout::default();
        t.start(0.0, 3000.0);
        t.start(2000.0, 3000.0);
        assert!(!t.expired(4000.0));
        assert!(t.expired(5000.0));
        assert!(!t.is_active());
        assert!(!t.expired(6000.0));
    }

    #[test]
    fn countdown_rounds_up_and_saturates() {
        let mut c = Countdown::new(60);
        assert_eq!(c.remaining_secs(), 60);
        c.advance(500.0);
        assert_eq!(c.remaining_secs(), 60);
        c.advance(59_500.0);
        assert_eq!(c.remaining_secs(), 0);
        assert!(c.is_expired());
        c.advance(1000.0);
        assert_eq!(c.remaining_secs(), 0);
    }
}
