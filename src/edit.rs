// Grid editor - selection and cell-edit state machine
// Mirrors how players punch frets in: click an empty cell and it instantly
// takes the last used fret and opens for editing; digits typed on a selected
// cell open editing pre-seeded; Delete clears without opening an editor

use uuid::Uuid;

use crate::model::grid::{RESOLUTION, STRING_COUNT, parse_fret};
use crate::model::part::Part;

/// Address of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub bar_id: Uuid,
    pub string_index: usize,
    pub step_index: usize,
}

impl CellRef {
    pub fn new(bar_id: Uuid, string_index: usize, step_index: usize) -> Self {
        Self {
            bar_id,
            string_index,
            step_index,
        }
    }

    fn in_shape(&self) -> bool {
        self.string_index < STRING_COUNT && self.step_index < RESOLUTION
    }
}

/// Editor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Selected(CellRef),
    Editing(CellRef),
}

/// What a cell click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResult {
    /// Empty cell: the default fret was written and editing began.
    /// Data changed - the caller should persist.
    FilledAndEditing,
    /// Second click on the already-selected cell: editing began on its
    /// current value
    Editing,
    /// Selection moved to the cell
    Selected,
    /// Unknown bar or out-of-shape coordinates
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
struct EditSession {
    cell: CellRef,
    draft: String,
}

/// Selection / cell-edit state machine for one part's grids.
///
/// Holds no reference to the data; every operation takes the part it acts
/// on, so the editor survives part switches (the caller resets it then).
#[derive(Debug, Default)]
pub struct GridEditor {
    selected: Option<CellRef>,
    editing: Option<EditSession>,
    last_used_fret: u8,
}

impl GridEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditorState {
        if let Some(session) = &self.editing {
            EditorState::Editing(session.cell)
        } else if let Some(cell) = self.selected {
            EditorState::Selected(cell)
        } else {
            EditorState::Idle
        }
    }

    pub fn selected(&self) -> Option<CellRef> {
        self.selected
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Current draft text while editing
    pub fn draft(&self) -> Option<&str> {
        self.editing.as_ref().map(|s| s.draft.as_str())
    }

    /// Drop all state (called when the active part changes)
    pub fn reset(&mut self) {
        self.selected = None;
        self.editing = None;
    }

    /// Handle a cell click.
    pub fn click_cell(&mut self, part: &mut Part, cell: CellRef) -> ClickResult {
        if !cell.in_shape() {
            return ClickResult::Ignored;
        }
        let Some(bar) = part.bar_mut(cell.bar_id) else {
            return ClickResult::Ignored;
        };

        match bar.grid.get(cell.string_index, cell.step_index) {
            None => {
                // Optimistic write-then-edit: the cell takes the sticky
                // default immediately, then opens for refinement
                let default = self.last_used_fret;
                bar.grid
                    .set(cell.string_index, cell.step_index, Some(default));
                self.selected = Some(cell);
                self.editing = Some(EditSession {
                    cell,
                    draft: default.to_string(),
                });
                ClickResult::FilledAndEditing
            }
            Some(current) if self.selected == Some(cell) && self.editing.is_none() => {
                self.editing = Some(EditSession {
                    cell,
                    draft: current.to_string(),
                });
                ClickResult::Editing
            }
            Some(_) => {
                self.selected = Some(cell);
                ClickResult::Selected
            }
        }
    }

    /// A digit typed while a cell is selected but not editing starts an edit
    /// seeded with that digit. Ignored otherwise.
    pub fn key_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() || self.editing.is_some() {
            return false;
        }
        let Some(cell) = self.selected else {
            return false;
        };
        self.editing = Some(EditSession {
            cell,
            draft: digit.to_string(),
        });
        true
    }

    /// Backspace/Delete while selected (not editing) clears the cell
    /// directly. Returns whether data changed.
    pub fn key_clear(&mut self, part: &mut Part) -> bool {
        if self.editing.is_some() {
            return false;
        }
        let Some(cell) = self.selected else {
            return false;
        };
        let Some(bar) = part.bar_mut(cell.bar_id) else {
            return false;
        };
        bar.grid.set(cell.string_index, cell.step_index, None);
        true
    }

    /// Append a character to the draft while editing
    pub fn draft_push(&mut self, c: char) {
        if let Some(session) = &mut self.editing {
            session.draft.push(c);
        }
    }

    /// Remove the last draft character while editing
    pub fn draft_backspace(&mut self) {
        if let Some(session) = &mut self.editing {
            session.draft.pop();
        }
    }

    /// Commit the draft: parse, clamp, write. Empty or non-numeric drafts
    /// clear the cell. Returns whether data changed (a commit always
    /// rewrites its cell, so true whenever an edit was open and the bar
    /// still exists).
    pub fn commit(&mut self, part: &mut Part) -> bool {
        let Some(session) = self.editing.take() else {
            return false;
        };
        let Some(bar) = part.bar_mut(session.cell.bar_id) else {
            return false;
        };

        let parsed = parse_fret(&session.draft);
        bar.grid
            .set(session.cell.string_index, session.cell.step_index, parsed);
        if let Some(fret) = parsed {
            self.last_used_fret = fret;
        }
        true
    }

    /// Abandon the draft, returning to the plain selection
    pub fn cancel(&mut self) {
        self.editing = None;
    }
}
