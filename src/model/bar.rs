// Bar - one measure of tablature with a fixed-resolution grid

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grid::{Grid, RESOLUTION};

/// One bar: identity, fret grid, and a free-text reminder.
///
/// The resolution is recorded per bar at creation and never mutated, so a
/// step's musical length is unambiguous for the lifetime of the bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub id: Uuid,
    pub resolution: usize,
    pub grid: Grid,
    #[serde(default)]
    pub note: String,
}

impl Bar {
    /// Fresh silent bar
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            resolution: RESOLUTION,
            grid: Grid::empty(),
            note: String::new(),
        }
    }

    /// Copy of this bar's content under a new identity
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            resolution: self.resolution,
            grid: self.grid.clone(),
            note: self.note.clone(),
        }
    }

    /// Wipe the grid and note, keeping the identity
    pub fn clear(&mut self) {
        self.grid.clear();
        self.note.clear();
    }
}
