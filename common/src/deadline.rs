//! A simple monotonic deadline, used to bound the broadcast retry loop so it
//! can't spin forever waiting for a confirmation that never comes.

use std::time::{Duration, Instant};

/// A point in time by which a retry loop must give up.
#[derive(Copy, Clone, Debug)]
pub struct Deadline(Instant);

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// Whether the deadline has passed.
    pub fn has_elapsed(&self) -> bool {
        Instant::now() >= self.0
    }

    /// Time remaining until the deadline, or `Duration::ZERO` if elapsed.
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}
