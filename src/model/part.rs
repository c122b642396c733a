// Part - an ordered run of bars practiced at its own working tempo

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sequencer::tempo::Tempo;

use super::bar::Bar;

/// How well a part is learnt. Progress bookkeeping beyond this field is the
/// caller's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearntState {
    Unlearnt,
    #[default]
    Learning,
    Learnt,
}

impl LearntState {
    /// Parse a persisted label; anything unknown falls back to the default.
    pub fn from_label(label: &str) -> Self {
        match label {
            "unlearnt" => LearntState::Unlearnt,
            "learning" => LearntState::Learning,
            "learnt" => LearntState::Learnt,
            _ => LearntState::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LearntState::Unlearnt => "unlearnt",
            LearntState::Learning => "learning",
            LearntState::Learnt => "learnt",
        }
    }
}

/// A practiced passage: ordered bars plus the tempo it is currently worked
/// at. Bar order is playback-significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    pub song_id: Uuid,
    pub title: String,
    pub working_tempo: Tempo,
    pub learnt_state: LearntState,
    bars: Vec<Bar>,
}

impl Part {
    /// Fresh part with the shape a new part always gets: two empty bars.
    pub fn new(song_id: Uuid, title: String, working_tempo: Tempo) -> Self {
        Self {
            id: Uuid::new_v4(),
            song_id,
            title,
            working_tempo,
            learnt_state: LearntState::Unlearnt,
            bars: vec![Bar::empty(), Bar::empty()],
        }
    }

    /// Rebuild a part from already-normalized pieces (store use). Callers
    /// must pass at least one bar.
    pub fn from_parts(
        id: Uuid,
        song_id: Uuid,
        title: String,
        working_tempo: Tempo,
        learnt_state: LearntState,
        bars: Vec<Bar>,
    ) -> Self {
        assert!(!bars.is_empty(), "a part always has at least one bar");
        Self {
            id,
            song_id,
            title,
            working_tempo,
            learnt_state,
            bars,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Mutable access to bar contents. A slice cannot change the bar count,
    /// so the at-least-one-bar invariant holds.
    pub fn bars_mut(&mut self) -> &mut [Bar] {
        &mut self.bars
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn bar(&self, bar_id: Uuid) -> Option<&Bar> {
        self.bars.iter().find(|b| b.id == bar_id)
    }

    pub fn bar_mut(&mut self, bar_id: Uuid) -> Option<&mut Bar> {
        self.bars.iter_mut().find(|b| b.id == bar_id)
    }

    /// Append a fresh empty bar and return its id
    pub fn add_bar(&mut self) -> Uuid {
        let bar = Bar::empty();
        let id = bar.id;
        self.bars.push(bar);
        id
    }

    /// Insert a copy of `bar_id` right after it. Returns the copy's id.
    pub fn duplicate_bar(&mut self, bar_id: Uuid) -> Option<Uuid> {
        let index = self.bars.iter().position(|b| b.id == bar_id)?;
        let copy = self.bars[index].duplicate();
        let id = copy.id;
        self.bars.insert(index + 1, copy);
        Some(id)
    }

    /// Append a copy of the last bar. Returns the copy's id.
    pub fn duplicate_last_bar(&mut self) -> Option<Uuid> {
        let last_id = self.bars.last()?.id;
        self.duplicate_bar(last_id)
    }

    /// Remove a bar. Refused when it is the last one - a part always keeps
    /// at least one bar. Returns whether a bar was removed.
    pub fn remove_bar(&mut self, bar_id: Uuid) -> bool {
        if self.bars.len() <= 1 {
            return false;
        }
        let before = self.bars.len();
        self.bars.retain(|b| b.id != bar_id);
        self.bars.len() != before
    }

    /// Wipe one bar's content in place
    pub fn clear_bar(&mut self, bar_id: Uuid) -> bool {
        match self.bar_mut(bar_id) {
            Some(bar) => {
                bar.clear();
                true
            }
            None => false,
        }
    }

    /// Throw away all bars and start over with two empty ones
    pub fn reset_bars(&mut self) {
        self.bars = vec![Bar::empty(), Bar::empty()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part() -> Part {
        Part::new(Uuid::new_v4(), "Chorus".to_string(), Tempo::new(90))
    }

    #[test]
    fn test_new_part_has_two_empty_bars() {
        let part = part();
        assert_eq!(part.bar_count(), 2);
        assert!(part.bars().iter().all(|b| b.grid.is_silent()));
        assert_eq!(part.learnt_state, LearntState::Unlearnt);
    }

    #[test]
    fn test_add_and_duplicate_bars() {
        let mut part = part();
        let added = part.add_bar();
        assert_eq!(part.bar_count(), 3);
        assert_eq!(part.bars()[2].id, added);

        part.bar_mut(added).unwrap().grid.set(1, 1, Some(9));
        let copy = part.duplicate_bar(added).unwrap();
        assert_eq!(part.bar_count(), 4);
        // Copy sits immediately after the original
        assert_eq!(part.bars()[3].id, copy);
        assert_eq!(part.bars()[3].grid.get(1, 1), Some(9));
    }

    #[test]
    fn test_duplicate_last_bar() {
        let mut part = part();
        let last_id = part.bars().last().unwrap().id;
        part.bar_mut(last_id).unwrap().note = "ending".to_string();

        part.duplicate_last_bar().unwrap();
        assert_eq!(part.bar_count(), 3);
        assert_eq!(part.bars()[2].note, "ending");
    }

    #[test]
    fn test_remove_bar_keeps_at_least_one() {
        let mut part = part();
        let first = part.bars()[0].id;
        let second = part.bars()[1].id;

        assert!(part.remove_bar(first));
        assert_eq!(part.bar_count(), 1);

        // Deleting the last remaining bar is refused
        assert!(!part.remove_bar(second));
        assert_eq!(part.bar_count(), 1);
    }

    #[test]
    fn test_remove_unknown_bar() {
        let mut part = part();
        assert!(!part.remove_bar(Uuid::new_v4()));
        assert_eq!(part.bar_count(), 2);
    }

    #[test]
    fn test_reset_bars() {
        let mut part = part();
        part.add_bar();
        part.bars_mut()[0].grid.set(0, 0, Some(1));

        part.reset_bars();
        assert_eq!(part.bar_count(), 2);
        assert!(part.bars().iter().all(|b| b.grid.is_silent()));
    }

    #[test]
    fn test_learnt_state_labels() {
        assert_eq!(LearntState::from_label("learnt"), LearntState::Learnt);
        assert_eq!(LearntState::from_label("unlearnt"), LearntState::Unlearnt);
        assert_eq!(LearntState::from_label("???"), LearntState::Learning);
        assert_eq!(LearntState::Learnt.label(), "learnt");
    }
}
