//! Wall-clock to simulation-time conversion.
//!
//! The core never owns a timer; the host measures elapsed wall time and
//! feeds it into [`crate::core::encounter::Encounter::tick`]. Every delta
//! passes through [`sanitize_delta`] so a suspended laptop, a clock jump,
//! or a NaN from a bad caller can never corrupt the simulation.

use std::time::Instant;

/// Clamps a wall-time delta to a usable tick duration.
///
/// Non-finite and negative values become 0 rather than propagating.
pub fn sanitize_delta(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Tracks the previous tick instant and hands out sanitized deltas.
#[derive(Debug)]
pub struct Clock {
    last: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call, sanitized.
    pub fn delta_seconds(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        sanitize_delta(dt)
    }

    /// Forget accumulated time, e.g. after a modal screen.
    pub fn rearm(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
