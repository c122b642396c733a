// Metronome - lookahead-scheduled click track
// Commits click times against the clock ahead of the poll cursor, so click
// precision is bounded by the clock, not the polling timer

use std::ops::ControlFlow;

use crate::audio::sink::{Tone, TriggerSink};

use super::beat::BeatTimes;
use super::scheduler::{LookaheadScheduler, START_GRACE};
use super::tempo::Tempo;

/// Metronome engine.
///
/// Idle whenever `times` is `None` - an idle metronome holds no schedule
/// state at all, so nothing can fire between stop and the next start.
#[derive(Debug)]
pub struct Metronome {
    scheduler: LookaheadScheduler,
    times: Option<BeatTimes>,
}

impl Metronome {
    pub fn new() -> Self {
        Self {
            scheduler: LookaheadScheduler::new(),
            times: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.times.is_some()
    }

    /// Start (or restart) clicking. The first click lands at
    /// `now + START_GRACE`.
    pub fn start(&mut self, now: f64, tempo: Tempo) {
        self.times = Some(BeatTimes::starting_at(
            now + START_GRACE,
            tempo.beat_duration(),
        ));
    }

    /// Stop clicking. Synchronous: after this returns no further click can
    /// be emitted, regardless of pending poll calls.
    pub fn stop(&mut self) {
        self.times = None;
    }

    /// Rebase the schedule after an abrupt tempo edit: the next click lands
    /// at `now + START_GRACE` instead of completing a full old-tempo beat.
    /// No-op while stopped.
    pub fn rebase(&mut self, now: f64) {
        if let Some(times) = &mut self.times {
            times.rebase(now + START_GRACE);
        }
    }

    /// Dispatch every click due within the lookahead window.
    ///
    /// The working tempo is read fresh on every poll, so gradual tempo
    /// changes take effect from the next committed click without rebasing.
    /// Returns the number of clicks emitted.
    pub fn poll<S: TriggerSink>(&mut self, now: f64, tempo: Tempo, sink: &mut S) -> usize {
        let Some(times) = &mut self.times else {
            return 0;
        };

        times.set_interval(tempo.beat_duration());
        self.scheduler.poll(now, times, |t| {
            sink.play_tone(t, Tone::click());
            sink.flash_indicator(t);
            ControlFlow::Continue(())
        })
    }
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sink::RecordingSink;
    use crate::sequencer::scheduler::SCHEDULE_AHEAD;

    fn run(metronome: &mut Metronome, sink: &mut RecordingSink, tempo: Tempo, from: f64, to: f64) {
        let mut now = from;
        while now < to {
            metronome.poll(now, tempo, sink);
            now += 0.025;
        }
    }

    #[test]
    fn test_idle_metronome_emits_nothing() {
        let mut metronome = Metronome::new();
        let mut sink = RecordingSink::new();

        assert!(!metronome.is_running());
        assert_eq!(metronome.poll(0.0, Tempo::new(120), &mut sink), 0);
        assert!(sink.tones.is_empty());
    }

    #[test]
    fn test_clicks_spaced_by_beat_duration() {
        let mut metronome = Metronome::new();
        let mut sink = RecordingSink::new();
        let tempo = Tempo::new(120);

        metronome.start(0.0, tempo);
        run(&mut metronome, &mut sink, tempo, 0.0, 4.0);

        let times = sink.tone_times();
        assert!(times.len() >= 7);
        assert!((times[0] - START_GRACE).abs() < 1e-9);
        for pair in times.windows(2) {
            assert!((pair[1] - pair[0] - 0.5).abs() < 1e-9);
        }
        // Every click also flashes the indicator
        assert_eq!(sink.flashes, times);
    }

    #[test]
    fn test_stop_is_synchronous() {
        let mut metronome = Metronome::new();
        let mut sink = RecordingSink::new();
        let tempo = Tempo::new(240);

        metronome.start(0.0, tempo);
        run(&mut metronome, &mut sink, tempo, 0.0, 1.0);
        assert!(!sink.tones.is_empty());

        metronome.stop();
        sink.clear();
        run(&mut metronome, &mut sink, tempo, 1.0, 3.0);
        assert!(sink.tones.is_empty());
        assert!(sink.flashes.is_empty());
    }

    #[test]
    fn test_tempo_change_reflected_within_grace() {
        let mut metronome = Metronome::new();
        let mut sink = RecordingSink::new();

        let slow = Tempo::new(60); // 1s beats
        metronome.start(0.0, slow);
        run(&mut metronome, &mut sink, slow, 0.0, 1.2);

        // Abrupt edit at t=1.2: rebase instead of finishing the slow beat
        let fast = Tempo::new(240); // 0.25s beats
        metronome.rebase(1.2);
        sink.clear();
        run(&mut metronome, &mut sink, fast, 1.2, 2.2);

        let times = sink.tone_times();
        assert!(!times.is_empty());
        // Next click lands one grace after the edit, not a full old beat later
        assert!((times[0] - (1.2 + START_GRACE)).abs() < 1e-9);
        for pair in times.windows(2) {
            assert!((pair[1] - pair[0] - 0.25).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gradual_tempo_change_without_rebase() {
        // Without an explicit rebase, already-committed clicks keep the old
        // spacing and future ones adopt the new interval
        let mut metronome = Metronome::new();
        let mut sink = RecordingSink::new();

        metronome.start(0.0, Tempo::new(120));
        metronome.poll(0.0, Tempo::new(120), &mut sink);
        let committed = sink.tones.len();
        assert!(committed >= 1);

        let mut now = 0.025;
        while now < 2.0 {
            metronome.poll(now, Tempo::new(60), &mut sink);
            now += 0.025;
        }

        let times = sink.tone_times();
        for pair in times.windows(2).skip(committed) {
            assert!((pair[1] - pair[0] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_restart_reprimes_schedule() {
        let mut metronome = Metronome::new();
        let mut sink = RecordingSink::new();
        let tempo = Tempo::new(120);

        metronome.start(0.0, tempo);
        run(&mut metronome, &mut sink, tempo, 0.0, 1.0);
        metronome.stop();

        sink.clear();
        metronome.start(10.0, tempo);
        metronome.poll(10.0, tempo, &mut sink);

        let times = sink.tone_times();
        assert!((times[0] - (10.0 + START_GRACE)).abs() < 1e-9);
        // Only the window's worth was committed
        assert!(times.last().unwrap() < &(10.0 + SCHEDULE_AHEAD));
    }
}
