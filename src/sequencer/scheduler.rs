// Lookahead scheduler - dispatches due events within a near-future window
// Decouples trigger-time precision (clock resolution) from callback
// frequency (poll interval): events are committed to precise future times
// at poll time instead of being fired "now" with up to a poll of jitter

use std::ops::ControlFlow;
use std::time::Duration;

use super::beat::BeatTimes;

/// How often a driver should call `poll`
pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How far ahead of `now` events are committed on each poll, in seconds.
/// Must stay comfortably larger than the poll interval or ticks land late.
pub const SCHEDULE_AHEAD: f64 = 0.12;

/// Offset applied when (re)starting a schedule: the first event lands at
/// `now + START_GRACE` so the consumer has setup headroom.
pub const START_GRACE: f64 = 0.05;

/// Window dispatcher over a [`BeatTimes`] sequence.
///
/// Holds no cursor of its own - the sequence is the cursor - so one
/// scheduler value can serve any number of independent runs.
#[derive(Debug, Clone, Copy)]
pub struct LookaheadScheduler {
    schedule_ahead: f64,
}

impl LookaheadScheduler {
    pub fn new() -> Self {
        Self {
            schedule_ahead: SCHEDULE_AHEAD,
        }
    }

    /// Scheduler with a custom horizon, mainly for window-semantics tests
    pub fn with_horizon(schedule_ahead: f64) -> Self {
        Self { schedule_ahead }
    }

    pub fn horizon(&self) -> f64 {
        self.schedule_ahead
    }

    /// Emit every pending time `t < now + horizon`, in non-decreasing order,
    /// exactly once, advancing the sequence past each emitted time.
    ///
    /// `emit` may return `ControlFlow::Break` to halt consumption (bounded
    /// sequences such as non-looping playback). Returns how many times were
    /// emitted this poll.
    pub fn poll<F>(&self, now: f64, times: &mut BeatTimes, mut emit: F) -> usize
    where
        F: FnMut(f64) -> ControlFlow<()>,
    {
        let horizon = now + self.schedule_ahead;
        let mut emitted = 0;

        while times.peek() < horizon {
            let t = times.advance();
            emitted += 1;
            if emit(t).is_break() {
                break;
            }
        }

        emitted
    }
}

impl Default for LookaheadScheduler {
    fn default() -> Self {
        Self::new()
    }
}
