use log::{log_enabled, warn, Level};
use std::time::{Duration, Instant};

/// Simple scoped timer for profiling the phases of a fixed step.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Option<Instant>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        let start = if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
            Some(Instant::now())
        } else {
            None
        };
        Self { label, start }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        if let Some(start) = self.start {
            log::trace!("end {} ({} µs)", self.label, start.elapsed().as_micros());
        }
    }
}

/// Logs a warning when an `update` call needed more fixed steps than expected.
pub fn warn_if_step_budget_exceeded(steps: usize, budget: usize, elapsed: Duration) {
    if steps > budget {
        warn!(
            "physics update ran {} fixed steps (budget {}), {:.2} ms of simulated time",
            steps,
            budget,
            elapsed.as_secs_f32() * 1000.0
        );
    }
}
