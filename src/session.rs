// Practice session - caller-owned context wiring library, engines, editor
// UI commands map 1:1 onto methods here; mutators report whether the
// library changed so the caller can persist afterwards

use uuid::Uuid;

use crate::audio::sink::TriggerSink;
use crate::edit::{CellRef, ClickResult, GridEditor};
use crate::model::part::LearntState;
use crate::model::song::{Library, Song};
use crate::sequencer::metronome::Metronome;
use crate::sequencer::playback::{PlayError, PlaybackOptions, PlaybackState, TabPlayback};
use crate::sequencer::tempo::Tempo;

/// One user's practice session over a loaded library.
///
/// Owns the only Metronome and TabPlayback instances, so their transient
/// state (tick schedule, cursor, highlight) has exactly one home. The two
/// engines schedule independently; switching song or part stops both.
pub struct PracticeSession {
    library: Library,
    metronome: Metronome,
    playback: TabPlayback,
    options: PlaybackOptions,
    editor: GridEditor,
}

impl PracticeSession {
    pub fn new(mut library: Library) -> Self {
        library.ensure_selection();
        Self {
            library,
            metronome: Metronome::new(),
            playback: TabPlayback::new(),
            options: PlaybackOptions::default(),
            editor: GridEditor::new(),
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn editor(&self) -> &GridEditor {
        &self.editor
    }

    pub fn options(&self) -> PlaybackOptions {
        self.options
    }

    pub fn metronome_running(&self) -> bool {
        self.metronome.is_running()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Currently sounding (bar id, step index), if playback is running
    pub fn highlight(&self) -> Option<(Uuid, usize)> {
        self.playback.highlight()
    }

    // ---------- polling ----------

    /// Drive both engines. Call at the scheduler's poll interval with the
    /// current clock time.
    pub fn poll<S: TriggerSink>(&mut self, now: f64, sink: &mut S) {
        let part = self.library.active_part();
        if let Some(part) = part {
            let tempo = part.working_tempo;
            self.metronome.poll(now, tempo, sink);
        }
        self.playback
            .poll(now, self.library.active_part(), self.options, sink);
    }

    // ---------- tempo ----------

    /// Nudge the active part's working tempo. Running schedules are rebased
    /// so the change is audible within one grace period. Returns whether the
    /// library changed.
    pub fn adjust_tempo(&mut self, now: f64, delta: i32) -> bool {
        let Some(part) = self.library.active_part_mut() else {
            return false;
        };
        part.working_tempo.adjust(delta);
        self.rebase_running(now);
        true
    }

    /// Set the active part's working tempo outright (clamped).
    pub fn set_tempo(&mut self, now: f64, bpm: u32) -> bool {
        let Some(part) = self.library.active_part_mut() else {
            return false;
        };
        part.working_tempo.set(bpm);
        self.rebase_running(now);
        true
    }

    fn rebase_running(&mut self, now: f64) {
        self.metronome.rebase(now);
        self.playback.rebase(now);
    }

    // ---------- metronome ----------

    /// Toggle the metronome. Returns whether it is running afterwards.
    pub fn toggle_metronome(&mut self, now: f64) -> bool {
        if self.metronome.is_running() {
            self.metronome.stop();
        } else if let Some(part) = self.library.active_part() {
            self.metronome.start(now, part.working_tempo);
        }
        self.metronome.is_running()
    }

    pub fn stop_metronome(&mut self) {
        self.metronome.stop();
    }

    // ---------- tab playback ----------

    pub fn start_playback(&mut self, now: f64) -> Result<(), PlayError> {
        let Some(part) = self.library.active_part() else {
            return Err(PlayError::NoActivePart);
        };
        self.playback.start(now, part)
    }

    pub fn stop_playback(&mut self) {
        self.playback.stop();
    }

    /// Stop both engines (part/song switches, deletions)
    pub fn stop_all(&mut self) {
        self.metronome.stop();
        self.playback.stop();
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.options.loop_enabled = enabled;
    }

    pub fn set_click_while_playing(&mut self, enabled: bool) {
        self.options.click_while_playing = enabled;
    }

    // ---------- songs and parts ----------

    /// Create a song with its first part and make it active.
    pub fn add_song(&mut self, title: String, goal_tempo: Tempo) -> Uuid {
        let mut song = Song::new(title, goal_tempo);
        let part_id = song.add_part("Part 1".to_string());
        let song_id = song.id;
        self.library.songs.push(song);
        self.library.active_song_id = Some(song_id);
        self.library.active_part_id = Some(part_id);
        self.stop_all();
        self.editor.reset();
        song_id
    }

    pub fn update_song(&mut self, song_id: Uuid, title: String, goal_tempo: Tempo) -> bool {
        let Some(song) = self.library.song_mut(song_id) else {
            return false;
        };
        song.title = title;
        song.goal_tempo = goal_tempo;
        true
    }

    pub fn select_song(&mut self, song_id: Uuid) -> bool {
        if !self.library.select_song(song_id) {
            return false;
        }
        self.stop_all();
        self.editor.reset();
        true
    }

    pub fn delete_song(&mut self, song_id: Uuid) -> bool {
        if !self.library.remove_song(song_id) {
            return false;
        }
        self.stop_all();
        self.editor.reset();
        true
    }

    /// Add a part to the active song. Without an explicit tempo the part
    /// starts at the song's goal tempo.
    pub fn add_part(&mut self, title: String, working_bpm: Option<u32>) -> Option<Uuid> {
        let song = self.library.active_song_mut()?;
        let part_id = song.add_part(title);
        if let Some(bpm) = working_bpm
            && let Some(part) = song.part_mut(part_id)
        {
            part.working_tempo = Tempo::new(bpm);
        }
        self.library.active_part_id = Some(part_id);
        self.stop_all();
        self.editor.reset();
        Some(part_id)
    }

    pub fn update_part(&mut self, part_id: Uuid, title: String, working_bpm: u32) -> bool {
        let Some(song) = self.library.active_song_mut() else {
            return false;
        };
        let Some(part) = song.part_mut(part_id) else {
            return false;
        };
        part.title = title;
        part.working_tempo = Tempo::new(working_bpm);
        true
    }

    pub fn select_part(&mut self, part_id: Uuid) -> bool {
        if !self.library.select_part(part_id) {
            return false;
        }
        self.stop_all();
        self.editor.reset();
        true
    }

    pub fn delete_part(&mut self, part_id: Uuid) -> bool {
        if !self.library.remove_active_song_part(part_id) {
            return false;
        }
        self.stop_all();
        self.editor.reset();
        true
    }

    pub fn set_learnt_state(&mut self, state: LearntState) -> bool {
        let Some(part) = self.library.active_part_mut() else {
            return false;
        };
        part.learnt_state = state;
        true
    }

    // ---------- bars ----------

    pub fn add_bar(&mut self) -> bool {
        match self.library.active_part_mut() {
            Some(part) => {
                part.add_bar();
                true
            }
            None => false,
        }
    }

    pub fn duplicate_bar(&mut self, bar_id: Uuid) -> bool {
        self.library
            .active_part_mut()
            .and_then(|part| part.duplicate_bar(bar_id))
            .is_some()
    }

    pub fn duplicate_last_bar(&mut self) -> bool {
        self.library
            .active_part_mut()
            .and_then(|part| part.duplicate_last_bar())
            .is_some()
    }

    pub fn clear_bar(&mut self, bar_id: Uuid) -> bool {
        self.library
            .active_part_mut()
            .is_some_and(|part| part.clear_bar(bar_id))
    }

    /// Remove a bar; refused when it is the part's last one.
    pub fn remove_bar(&mut self, bar_id: Uuid) -> bool {
        self.library
            .active_part_mut()
            .is_some_and(|part| part.remove_bar(bar_id))
    }

    /// Reset the active part to two empty bars.
    pub fn clear_all_bars(&mut self) -> bool {
        match self.library.active_part_mut() {
            Some(part) => {
                part.reset_bars();
                true
            }
            None => false,
        }
    }

    pub fn set_bar_note(&mut self, bar_id: Uuid, note: String) -> bool {
        let Some(part) = self.library.active_part_mut() else {
            return false;
        };
        let Some(bar) = part.bar_mut(bar_id) else {
            return false;
        };
        bar.note = note;
        true
    }

    // ---------- grid editing ----------

    /// Cell click. `FilledAndEditing` means the library changed.
    pub fn click_cell(&mut self, cell: CellRef) -> ClickResult {
        let Some(part) = self.library.active_part_mut() else {
            return ClickResult::Ignored;
        };
        self.editor.click_cell(part, cell)
    }

    pub fn key_digit(&mut self, digit: char) -> bool {
        self.editor.key_digit(digit)
    }

    /// Backspace/Delete on the selection. Returns whether data changed.
    pub fn key_clear(&mut self) -> bool {
        let Some(part) = self.library.active_part_mut() else {
            return false;
        };
        self.editor.key_clear(part)
    }

    pub fn draft_push(&mut self, c: char) {
        self.editor.draft_push(c);
    }

    pub fn draft_backspace(&mut self) {
        self.editor.draft_backspace();
    }

    /// Commit the open edit. Returns whether data changed.
    pub fn commit_edit(&mut self) -> bool {
        let Some(part) = self.library.active_part_mut() else {
            return false;
        };
        self.editor.commit(part)
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel();
    }
}
