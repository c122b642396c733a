// Tab grid - fixed-shape fret matrix for one bar
// 6 strings x RESOLUTION steps; a cell is a fret number or silence

use serde::{Deserialize, Serialize};

/// Instrument strings, low E first
pub const STRING_COUNT: usize = 6;

/// Steps per bar. Fixed per bar at creation so step timing is unambiguous.
pub const RESOLUTION: usize = 64;

/// Display labels per string, low to high
pub const STRING_LABELS: [&str; STRING_COUNT] = ["E", "A", "D", "G", "B", "e"];

/// MIDI note of each open string (standard tuning)
pub const BASE_MIDI: [u8; STRING_COUNT] = [40, 45, 50, 55, 59, 64];

/// Highest playable fret
pub const MAX_FRET: u8 = 24;

/// Clamp an arbitrary finite number to a valid fret (nearest integer).
pub fn clamp_fret(value: f64) -> u8 {
    value.round().clamp(0.0, MAX_FRET as f64) as u8
}

/// Parse free-text fret input. Empty or non-numeric input means "no note";
/// anything numeric is clamped to [0, MAX_FRET], rounding to nearest.
/// Never fails - bad input silently becomes silence.
pub fn parse_fret(input: &str) -> Option<u8> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(clamp_fret(value))
}

/// Fret grid of one bar, indexed by (string, step).
///
/// The shape is invariant: exactly [`STRING_COUNT`] rows of [`RESOLUTION`]
/// cells. Out-of-shape persisted data never reaches this type - the store
/// normalizes it first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    cells: Vec<Vec<Option<u8>>>,
}

impl Grid {
    /// All-silent grid of the fixed shape
    pub fn empty() -> Self {
        Self {
            cells: vec![vec![None; RESOLUTION]; STRING_COUNT],
        }
    }

    /// Cell value. Panics on out-of-shape indices; callers validate UI
    /// coordinates before they get here.
    pub fn get(&self, string_index: usize, step_index: usize) -> Option<u8> {
        self.cells[string_index][step_index]
    }

    /// Write a cell. The fret is clamped to the valid range.
    pub fn set(&mut self, string_index: usize, step_index: usize, value: Option<u8>) {
        self.cells[string_index][step_index] = value.map(|f| f.min(MAX_FRET));
    }

    /// Sounding notes of one step column, as (string_index, fret) pairs in
    /// string order. This is the per-step trigger set during playback.
    pub fn column(&self, step_index: usize) -> Vec<(usize, u8)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(string_index, row)| {
                row[step_index].map(|fret| (string_index, fret))
            })
            .collect()
    }

    /// True when no cell holds a note
    pub fn is_silent(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_none()))
    }

    /// Reset every cell to silence
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(None);
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}
