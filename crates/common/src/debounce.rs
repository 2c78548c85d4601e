//! Debounce timing for the auto-preview path.
//!
//! Every model mutation restarts a fixed quiet period. Only once the
//! project has been quiescent for the whole period does a request fire,
//! and each firing is stamped with a generation so that responses from
//! superseded requests can be recognized and discarded.

use std::time::{Duration, Instant};

/// Restartable quiet-period timer with generation stamping.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    /// Generation of the most recent firing.
    fired: u64,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            fired: 0,
        }
    }

    /// Create a debouncer from a millisecond quiet period.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Record activity at `now`, restarting the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Whether activity is waiting for its quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Instant at which the pending activity will fire.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the quiet period has elapsed.
    ///
    /// Returns the generation of the new firing. The timer disarms until
    /// the next `touch`.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.fired += 1;
                Some(self.fired)
            }
            _ => None,
        }
    }

    /// Whether a response for `generation` is still the newest one.
    pub fn is_latest(&self, generation: u64) -> bool {
        generation == self.fired
    }

    /// Generation of the most recent firing (0 before the first).
    pub fn latest_generation(&self) -> u64 {
        self.fired
    }

    /// Quiet period length.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
