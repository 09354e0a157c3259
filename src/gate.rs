//! Detection debounce gate.
//!
//! Detector invocations are expensive; the gate bounds how often they run.
//! The gate is owned by the capture loop alone, so the recorded instant
//! needs no locking.

use std::time::{Duration, Instant};

/// Decides, per cycle, whether detection should run.
///
/// The first query always fires. After that a query fires only when the
/// elapsed time since the last firing strictly exceeds the timeout, and the
/// recorded instant is refreshed on every firing.
#[derive(Debug)]
pub struct DetectionGate {
    timeout: Duration,
    last_fired: Option<Instant>,
}

impl DetectionGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_fired: None,
        }
    }

    /// Should detection run at `now`?
    ///
    /// A zero timeout fires on every query with any positive elapsed time,
    /// which reproduces an ungated per-frame detection loop.
    pub fn should_run(&mut self, now: Instant) -> bool {
        match self.last_fired {
            None => {
                self.last_fired = Some(now);
                true
            }
            Some(last) => {
                if now.duration_since(last) > self.timeout {
                    self.last_fired = Some(now);
                    true
                } else {
                    false
                }
            }
        }
    }
}
