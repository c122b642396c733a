// Beat sequencer - lazy arithmetic sequence of scheduled timestamps
// Each time is derived by addition from the previous one, never by sampling
// the clock at fire time, so the sequence accumulates no drift

/// Restartable, infinite sequence of absolute beat (or step) times.
///
/// `peek`/`advance` give the lookahead scheduler cursor-style access;
/// the `Iterator` impl exists for bounded consumption in tests and tools.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTimes {
    next: f64,
    interval: f64,
}

impl BeatTimes {
    /// Sequence starting at `start`, spaced `interval` seconds apart.
    /// The interval is forced positive; a degenerate interval would spin the
    /// scheduling loop forever.
    pub fn starting_at(start: f64, interval: f64) -> Self {
        Self {
            next: start,
            interval: interval.max(f64::MIN_POSITIVE),
        }
    }

    /// Next scheduled time without consuming it
    pub fn peek(&self) -> f64 {
        self.next
    }

    /// Consume and return the next scheduled time
    pub fn advance(&mut self) -> f64 {
        let current = self.next;
        self.next += self.interval;
        current
    }

    /// Current spacing in seconds
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Change the spacing for all future times. Times already consumed are
    /// unaffected; the pending time keeps its place.
    pub fn set_interval(&mut self, interval: f64) {
        self.interval = interval.max(f64::MIN_POSITIVE);
    }

    /// Restart the sequence from `start`, discarding the pending time.
    /// Used on abrupt tempo edits instead of strict continuation, so a large
    /// jump produces neither a burst of stale ticks nor a long silent gap.
    pub fn rebase(&mut self, start: f64) {
        self.next = start;
    }
}

impl Iterator for BeatTimes {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.advance())
    }
}
