// Tablature playback - steps a bar grid in time and emits note triggers
// Same lookahead scheduling as the metronome, with a step cursor advanced
// once per emitted time and a part-identity guard checked at every poll

use std::ops::ControlFlow;

use uuid::Uuid;

use crate::audio::sink::{Tone, TriggerSink};
use crate::model::grid::RESOLUTION;
use crate::model::part::Part;

use super::beat::BeatTimes;
use super::scheduler::{LookaheadScheduler, START_GRACE};

/// Playback lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Never started since construction
    #[default]
    Idle,
    /// Actively scheduling steps
    Running,
    /// Halted by request, natural end, or a vanished part
    Stopped,
}

impl PlaybackState {
    pub fn is_running(&self) -> bool {
        matches!(self, PlaybackState::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackState::Stopped)
    }
}

/// Transient playback position. Reset to (0, 0) on every start; never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackCursor {
    pub bar_index: usize,
    pub step_index: usize,
}

/// Live playback options, read fresh at each poll so toggling them mid-run
/// takes effect at the next step
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackOptions {
    /// Wrap to the first bar after the last instead of stopping
    pub loop_enabled: bool,
    /// Emit a click alongside any step that triggers at least one note
    pub click_while_playing: bool,
}

/// A play request that could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    #[error("no part selected")]
    NoActivePart,

    #[error("part has no bars")]
    NoBars,
}

/// Tablature playback engine.
///
/// Does not own the part it plays: the current part is re-resolved by the
/// caller and passed into every poll, so deletion or switching underneath a
/// running playback is detected at the next step boundary and treated as an
/// implicit stop.
#[derive(Debug)]
pub struct TabPlayback {
    scheduler: LookaheadScheduler,
    times: Option<BeatTimes>,
    state: PlaybackState,
    part_id: Option<Uuid>,
    cursor: PlaybackCursor,
    highlight: Option<(Uuid, usize)>,
}

impl TabPlayback {
    pub fn new() -> Self {
        Self {
            scheduler: LookaheadScheduler::new(),
            times: None,
            state: PlaybackState::Idle,
            part_id: None,
            cursor: PlaybackCursor::default(),
            highlight: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    /// The one currently-sounding grid position as (bar id, step index),
    /// if playback is running. Exclusive by construction: setting a new
    /// highlight replaces the previous one atomically.
    pub fn highlight(&self) -> Option<(Uuid, usize)> {
        self.highlight
    }

    /// Begin playback of `part` from its first bar and step. The first step
    /// lands at `now + START_GRACE`.
    pub fn start(&mut self, now: f64, part: &Part) -> Result<(), PlayError> {
        if part.bar_count() == 0 {
            return Err(PlayError::NoBars);
        }

        self.state = PlaybackState::Running;
        self.part_id = Some(part.id);
        self.cursor = PlaybackCursor::default();
        self.highlight = None;
        self.times = Some(BeatTimes::starting_at(
            now + START_GRACE,
            part.working_tempo.step_duration(RESOLUTION),
        ));
        Ok(())
    }

    /// Stop playback. Synchronous: the pending schedule is dropped and the
    /// highlight cleared before this returns, so no step event can fire
    /// afterwards.
    pub fn stop(&mut self) {
        if self.state.is_running() {
            self.state = PlaybackState::Stopped;
        }
        self.times = None;
        self.highlight = None;
    }

    /// Rebase the step schedule after an abrupt tempo edit. No-op unless
    /// running.
    pub fn rebase(&mut self, now: f64) {
        if let Some(times) = &mut self.times {
            times.rebase(now + START_GRACE);
        }
    }

    /// Dispatch every step due within the lookahead window.
    ///
    /// `part` is the caller's *current* active part; `None`, a different
    /// part, or one whose bars no longer cover the cursor stops playback
    /// instead of walking stale data. Returns the number of steps emitted.
    pub fn poll<S: TriggerSink>(
        &mut self,
        now: f64,
        part: Option<&Part>,
        options: PlaybackOptions,
        sink: &mut S,
    ) -> usize {
        if !self.state.is_running() {
            return 0;
        }

        let part = match part {
            Some(part)
                if Some(part.id) == self.part_id
                    && self.cursor.bar_index < part.bar_count() =>
            {
                part
            }
            _ => {
                self.stop();
                return 0;
            }
        };

        let Some(mut times) = self.times.take() else {
            self.stop();
            return 0;
        };

        // Tempo is read live so gradual edits reach the next committed step
        times.set_interval(part.working_tempo.step_duration(RESOLUTION));

        let state = &mut self.state;
        let cursor = &mut self.cursor;
        let highlight = &mut self.highlight;

        let emitted = self.scheduler.poll(now, &mut times, |t| {
            let bar = &part.bars()[cursor.bar_index];
            let notes = bar.grid.column(cursor.step_index);

            for &(string_index, fret) in &notes {
                sink.play_tone(t, Tone::pluck(string_index, fret));
            }
            if options.click_while_playing && !notes.is_empty() {
                sink.play_tone(t, Tone::click());
            }
            *highlight = Some((bar.id, cursor.step_index));

            cursor.step_index += 1;
            if cursor.step_index == RESOLUTION {
                cursor.step_index = 0;
                cursor.bar_index += 1;
                if cursor.bar_index == part.bar_count() {
                    if options.loop_enabled {
                        cursor.bar_index = 0;
                    } else {
                        *state = PlaybackState::Stopped;
                        return ControlFlow::Break(());
                    }
                }
            }
            ControlFlow::Continue(())
        });

        if self.state.is_running() {
            self.times = Some(times);
        } else {
            // Natural end inside this poll: drop the schedule and highlight
            self.highlight = None;
        }
        emitted
    }
}

impl Default for TabPlayback {
    fn default() -> Self {
        Self::new()
    }
}
