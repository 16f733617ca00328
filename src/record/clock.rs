use std::time::{Duration, Instant};

use crate::foundation::error::StudioResult;
use crate::record::cancel::CancellationToken;

/// How long the recorder waits between image changes.
///
/// Frames are emitted at the capture rate regardless of the clock; the clock only decides
/// whether the hold also takes wall time.
pub trait Clock: Send {
    /// Wait `secs`, returning early with `Cancelled` when `cancel` fires.
    fn hold(&mut self, secs: f64, cancel: &CancellationToken) -> StudioResult<()>;
}

/// Holds complete instantly. Output is identical to a realtime render.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedClock {
    held_secs: f64,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time held so far.
    pub fn held_secs(&self) -> f64 {
        self.held_secs
    }
}

impl Clock for SimulatedClock {
    fn hold(&mut self, secs: f64, cancel: &CancellationToken) -> StudioResult<()> {
        cancel.check()?;
        self.held_secs += secs.max(0.0);
        Ok(())
    }
}

/// Sleeps for the hold, polling the cancellation token.
#[derive(Clone, Copy, Debug)]
pub struct RealtimeClock {
    poll: Duration,
}

impl Default for RealtimeClock {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(20),
        }
    }
}

impl RealtimeClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for RealtimeClock {
    fn hold(&mut self, secs: f64, cancel: &CancellationToken) -> StudioResult<()> {
        let deadline = Instant::now() + Duration::from_secs_f64(secs.max(0.0));
        loop {
            cancel.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(self.poll.min(deadline - now));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/record/clock.rs"]
mod tests;
