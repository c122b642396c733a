// Trigger sink - consumer interface for scheduled audio/visual events
// Every event carries a future timestamp against the engine clock; sinks
// must honor it rather than firing immediately, or scheduling precision
// collapses back to poll-interval jitter

use crate::model::grid::BASE_MIDI;

/// Waveform family of a scheduled tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneShape {
    /// Short square-wave burst (metronome / step click)
    Click,
    /// Triangle wave with plucked-string decay envelope
    Pluck,
}

/// Pitch spec for one scheduled tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f64,
    pub duration: f64,
    pub shape: ToneShape,
}

impl Tone {
    /// Metronome click: 950 Hz square, 50 ms
    pub fn click() -> Self {
        Self {
            frequency: 950.0,
            duration: 0.05,
            shape: ToneShape::Click,
        }
    }

    /// Plucked note for a fret on a string (standard tuning, low E = string 0)
    pub fn pluck(string_index: usize, fret: u8) -> Self {
        let midi = BASE_MIDI[string_index] as f64 + fret as f64;
        Self {
            frequency: 440.0 * 2f64.powf((midi - 69.0) / 12.0),
            duration: 0.4,
            shape: ToneShape::Pluck,
        }
    }
}

/// Consumer of scheduled trigger events.
///
/// `at` is an absolute time on the same clock the scheduler was polled with.
pub trait TriggerSink {
    /// Sound `tone` starting at time `at`
    fn play_tone(&mut self, at: f64, tone: Tone);

    /// Pulse the beat indicator at time `at`
    fn flash_indicator(&mut self, at: f64);
}

/// Sink that discards everything. Lets the engines run headless.
#[derive(Debug, Default)]
pub struct NullSink;

impl TriggerSink for NullSink {
    fn play_tone(&mut self, _at: f64, _tone: Tone) {}
    fn flash_indicator(&mut self, _at: f64) {}
}

/// Sink that records every event it receives, for harnesses and tests
/// driving synthetic time.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub tones: Vec<(f64, Tone)>,
    pub flashes: Vec<f64>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.tones.clear();
        self.flashes.clear();
    }

    /// Timestamps of recorded tones, in receive order
    pub fn tone_times(&self) -> Vec<f64> {
        self.tones.iter().map(|(t, _)| *t).collect()
    }
}

impl TriggerSink for RecordingSink {
    fn play_tone(&mut self, at: f64, tone: Tone) {
        self.tones.push((at, tone));
    }

    fn flash_indicator(&mut self, at: f64) {
        self.flashes.push(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_tone() {
        let tone = Tone::click();
        assert_eq!(tone.frequency, 950.0);
        assert_eq!(tone.duration, 0.05);
        assert_eq!(tone.shape, ToneShape::Click);
    }

    #[test]
    fn test_pluck_frequencies_follow_tuning() {
        // Open low E (string 0) is MIDI 40 = E2 ~ 82.41 Hz
        let low_e = Tone::pluck(0, 0);
        assert!((low_e.frequency - 82.4069).abs() < 0.01);

        // High e string, 5th fret is MIDI 69 = A440 exactly
        let a440 = Tone::pluck(5, 5);
        assert!((a440.frequency - 440.0).abs() < 1e-9);

        // One fret = one semitone
        let ratio = Tone::pluck(0, 1).frequency / Tone::pluck(0, 0).frequency;
        assert!((ratio - 2f64.powf(1.0 / 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_recording_sink_collects_in_order() {
        let mut sink = RecordingSink::new();
        sink.play_tone(0.5, Tone::click());
        sink.play_tone(1.0, Tone::pluck(5, 0));
        sink.flash_indicator(0.5);

        assert_eq!(sink.tone_times(), vec![0.5, 1.0]);
        assert_eq!(sink.flashes, vec![0.5]);
    }
}
