// Song and library - the practiced repertoire and its active selection

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sequencer::tempo::Tempo;

use super::part::{LearntState, Part};

/// Goal tempo a song defaults to when none is stored
pub const DEFAULT_GOAL_BPM: u32 = 82;

/// A song: ordered parts plus the tempo the player is working towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub goal_tempo: Tempo,
    /// Part to re-select when the song becomes active again
    pub last_part_id: Option<Uuid>,
    pub parts: Vec<Part>,
}

impl Song {
    pub fn new(title: String, goal_tempo: Tempo) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            goal_tempo,
            last_part_id: None,
            parts: Vec::new(),
        }
    }

    pub fn part(&self, part_id: Uuid) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == part_id)
    }

    pub fn part_mut(&mut self, part_id: Uuid) -> Option<&mut Part> {
        self.parts.iter_mut().find(|p| p.id == part_id)
    }

    /// Add a new part at the song's goal tempo and remember it as the last
    /// selection. Returns the new part's id.
    pub fn add_part(&mut self, title: String) -> Uuid {
        let part = Part::new(self.id, title, self.goal_tempo);
        let id = part.id;
        self.parts.push(part);
        self.last_part_id = Some(id);
        id
    }

    pub fn remove_part(&mut self, part_id: Uuid) -> bool {
        let before = self.parts.len();
        self.parts.retain(|p| p.id != part_id);
        if self.last_part_id == Some(part_id) {
            self.last_part_id = self.parts.first().map(|p| p.id);
        }
        self.parts.len() != before
    }
}

/// The whole persisted universe: songs plus which song/part is active.
///
/// Selection repair lives here so every caller sees the same policy: a
/// dangling active id falls back to the first available entry, and a song's
/// remembered part wins over its first part when both exist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Library {
    pub songs: Vec<Song>,
    pub active_song_id: Option<Uuid>,
    pub active_part_id: Option<Uuid>,
}

impl Library {
    pub fn new(songs: Vec<Song>) -> Self {
        let mut library = Self {
            songs,
            active_song_id: None,
            active_part_id: None,
        };
        library.ensure_selection();
        library
    }

    /// The starter library seeded on first run: one song, one riff with a
    /// couple of frets filled in to invite editing.
    pub fn demo() -> Self {
        let mut song = Song::new("Sample Song".to_string(), Tempo::new(DEFAULT_GOAL_BPM));
        let part_id = song.add_part("Intro riff".to_string());

        if let Some(part) = song.part_mut(part_id) {
            part.working_tempo = Tempo::new(62);
            part.learnt_state = LearntState::Learning;
            let bar = &mut part.bars_mut()[0];
            bar.grid.set(5, 0, Some(0));
            bar.grid.set(5, 4, Some(2));
            bar.note = "Try editing a fret number.".to_string();
        }

        let song_id = song.id;
        Self {
            songs: vec![song],
            active_song_id: Some(song_id),
            active_part_id: Some(part_id),
        }
    }

    pub fn song(&self, song_id: Uuid) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == song_id)
    }

    pub fn song_mut(&mut self, song_id: Uuid) -> Option<&mut Song> {
        self.songs.iter_mut().find(|s| s.id == song_id)
    }

    pub fn active_song(&self) -> Option<&Song> {
        self.song(self.active_song_id?)
    }

    pub fn active_song_mut(&mut self) -> Option<&mut Song> {
        self.song_mut(self.active_song_id?)
    }

    pub fn active_part(&self) -> Option<&Part> {
        self.active_song()?.part(self.active_part_id?)
    }

    pub fn active_part_mut(&mut self) -> Option<&mut Part> {
        let part_id = self.active_part_id?;
        self.active_song_mut()?.part_mut(part_id)
    }

    /// Make `song_id` active and restore its remembered part selection.
    /// Returns false for an unknown song.
    pub fn select_song(&mut self, song_id: Uuid) -> bool {
        if self.song(song_id).is_none() {
            return false;
        }
        self.active_song_id = Some(song_id);
        self.active_part_id = None;
        self.ensure_selection();
        true
    }

    /// Make `part_id` of the active song the active part and remember it on
    /// the song. Returns false when it does not belong to the active song.
    pub fn select_part(&mut self, part_id: Uuid) -> bool {
        let Some(song) = self.active_song_mut() else {
            return false;
        };
        if song.part(part_id).is_none() {
            return false;
        }
        song.last_part_id = Some(part_id);
        self.active_part_id = Some(part_id);
        true
    }

    /// Delete a song, repairing the active selection if it pointed there.
    pub fn remove_song(&mut self, song_id: Uuid) -> bool {
        let before = self.songs.len();
        self.songs.retain(|s| s.id != song_id);
        let removed = self.songs.len() != before;
        if removed && self.active_song_id == Some(song_id) {
            self.active_song_id = None;
            self.active_part_id = None;
            self.ensure_selection();
        }
        removed
    }

    /// Delete a part from the active song, repairing the selection.
    pub fn remove_active_song_part(&mut self, part_id: Uuid) -> bool {
        let was_active = self.active_part_id == Some(part_id);
        let Some(song) = self.active_song_mut() else {
            return false;
        };
        let removed = song.remove_part(part_id);
        if removed && was_active {
            self.active_part_id = None;
            self.ensure_selection();
        }
        removed
    }

    /// Repair dangling or missing selection: fall back to the first song,
    /// then to that song's remembered part if it still exists, else its
    /// first part.
    pub fn ensure_selection(&mut self) {
        if self.active_song_id.and_then(|id| self.song(id)).is_none() {
            self.active_song_id = self.songs.first().map(|s| s.id);
            self.active_part_id = None;
        }

        let Some(song) = self.active_song() else {
            self.active_part_id = None;
            return;
        };

        if self.active_part_id.is_some_and(|id| song.part(id).is_some()) {
            return;
        }

        let fallback = song
            .last_part_id
            .filter(|&id| song.part(id).is_some())
            .or_else(|| song.parts.first().map(|p| p.id));
        self.active_part_id = fallback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_library_shape() {
        let library = Library::demo();
        assert_eq!(library.songs.len(), 1);

        let song = library.active_song().unwrap();
        assert_eq!(song.title, "Sample Song");
        assert_eq!(song.goal_tempo.bpm(), DEFAULT_GOAL_BPM);

        let part = library.active_part().unwrap();
        assert_eq!(part.working_tempo.bpm(), 62);
        assert_eq!(part.bar_count(), 2);
        assert_eq!(part.bars()[0].grid.get(5, 0), Some(0));
        assert_eq!(part.bars()[0].grid.get(5, 4), Some(2));
    }

    #[test]
    fn test_add_part_uses_goal_tempo() {
        let mut song = Song::new("S".to_string(), Tempo::new(100));
        let id = song.add_part("P".to_string());
        assert_eq!(song.part(id).unwrap().working_tempo.bpm(), 100);
        assert_eq!(song.last_part_id, Some(id));
    }

    #[test]
    fn test_select_part_updates_memory() {
        let mut library = Library::demo();
        let song_id = library.active_song_id.unwrap();
        let second = library
            .song_mut(song_id)
            .unwrap()
            .add_part("Part 2".to_string());

        assert!(library.select_part(second));
        assert_eq!(library.active_part_id, Some(second));
        assert_eq!(library.song(song_id).unwrap().last_part_id, Some(second));
    }

    #[test]
    fn test_song_switch_restores_remembered_part() {
        let mut library = Library::demo();
        let first_song = library.active_song_id.unwrap();
        let remembered = library.active_part_id.unwrap();

        let mut other = Song::new("Other".to_string(), Tempo::new(120));
        other.add_part("Solo".to_string());
        let other_id = other.id;
        library.songs.push(other);

        assert!(library.select_song(other_id));
        assert_ne!(library.active_part_id, Some(remembered));

        assert!(library.select_song(first_song));
        assert_eq!(library.active_part_id, Some(remembered));
    }

    #[test]
    fn test_remove_active_song_repairs_selection() {
        let mut library = Library::demo();
        let song_id = library.active_song_id.unwrap();

        let mut other = Song::new("Other".to_string(), Tempo::new(120));
        let other_part = other.add_part("Solo".to_string());
        let other_id = other.id;
        library.songs.push(other);

        assert!(library.remove_song(song_id));
        assert_eq!(library.active_song_id, Some(other_id));
        assert_eq!(library.active_part_id, Some(other_part));
    }

    #[test]
    fn test_remove_last_song_clears_selection() {
        let mut library = Library::demo();
        let song_id = library.active_song_id.unwrap();

        assert!(library.remove_song(song_id));
        assert!(library.songs.is_empty());
        assert_eq!(library.active_song_id, None);
        assert_eq!(library.active_part_id, None);
    }

    #[test]
    fn test_remove_part_repairs_selection() {
        let mut library = Library::demo();
        let song_id = library.active_song_id.unwrap();
        let first_part = library.active_part_id.unwrap();
        let second = library
            .song_mut(song_id)
            .unwrap()
            .add_part("Part 2".to_string());
        library.select_part(first_part);

        assert!(library.remove_active_song_part(first_part));
        assert_eq!(library.active_part_id, Some(second));
    }

    #[test]
    fn test_ensure_selection_with_dangling_ids() {
        let mut library = Library::demo();
        library.active_song_id = Some(Uuid::new_v4());
        library.active_part_id = Some(Uuid::new_v4());

        library.ensure_selection();
        assert_eq!(library.active_song_id, Some(library.songs[0].id));
        assert!(library.active_part().is_some());
    }
}
