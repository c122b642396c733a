// Persisted document - permissive on the way in, strict on the way out
// Loads go through raw types that tolerate any missing or malformed field,
// then one normalization pass builds the validated model; nothing downstream
// ever branches on the stored shape again

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::bar::Bar;
use crate::model::grid::{Grid, RESOLUTION, STRING_COUNT, clamp_fret};
use crate::model::part::{LearntState, Part};
use crate::model::song::{DEFAULT_GOAL_BPM, Library, Song};
use crate::sequencer::tempo::Tempo;

/// Current on-disk format version
pub const DOCUMENT_VERSION: u32 = 1;

/// Shape written on save
#[derive(Debug, Serialize)]
pub struct PersistedDocument<'a> {
    pub version: u32,
    pub saved_at: String,
    pub songs: &'a [Song],
    pub active_song_id: Option<Uuid>,
    pub active_part_id: Option<Uuid>,
}

impl<'a> PersistedDocument<'a> {
    pub fn of(library: &'a Library) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            songs: &library.songs,
            active_song_id: library.active_song_id,
            active_part_id: library.active_part_id,
        }
    }
}

/// Accepted on load: the current document shape, or a legacy bare song array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawRoot {
    Document(RawDocument),
    Songs(Vec<RawSong>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDocument {
    pub songs: Option<Vec<RawSong>>,
    #[serde(alias = "activeSongId")]
    pub active_song_id: Option<Value>,
    #[serde(alias = "activePartId")]
    pub active_part_id: Option<Value>,
}

// Scalar fields stay as Value so a wrong-typed cell degrades that one field
// instead of failing the whole document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSong {
    pub id: Option<Value>,
    pub title: Option<String>,
    #[serde(alias = "goalBpm")]
    pub goal_tempo: Option<Value>,
    #[serde(alias = "lastPartId")]
    pub last_part_id: Option<Value>,
    pub parts: Option<Vec<RawPart>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawPart {
    pub id: Option<Value>,
    pub title: Option<String>,
    #[serde(alias = "workingBpm")]
    pub working_tempo: Option<Value>,
    #[serde(alias = "learntState")]
    pub learnt_state: Option<String>,
    pub bars: Option<Vec<RawBar>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawBar {
    pub id: Option<Value>,
    pub grid: Option<Vec<Vec<Value>>>,
    pub note: Option<String>,
}

/// Normalize a loaded document into the strict model. Dangling active ids
/// are repaired by the library's own selection logic.
pub fn normalize(root: RawRoot) -> Library {
    let (raw_songs, active_song, active_part) = match root {
        RawRoot::Document(doc) => (
            doc.songs.unwrap_or_default(),
            doc.active_song_id,
            doc.active_part_id,
        ),
        RawRoot::Songs(songs) => (songs, None, None),
    };

    let songs: Vec<Song> = raw_songs.into_iter().map(normalize_song).collect();
    let mut library = Library {
        songs,
        active_song_id: parse_id(active_song),
        active_part_id: parse_id(active_part),
    };
    library.ensure_selection();
    library
}

fn parse_id(raw: Option<Value>) -> Option<Uuid> {
    raw?.as_str().and_then(|s| Uuid::parse_str(s).ok())
}

fn id_or_new(raw: Option<Value>) -> Uuid {
    parse_id(raw).unwrap_or_else(Uuid::new_v4)
}

fn parse_tempo(raw: Option<Value>) -> Option<Tempo> {
    raw?.as_f64().and_then(Tempo::from_raw)
}

fn normalize_song(raw: RawSong) -> Song {
    let id = id_or_new(raw.id);
    let goal_tempo = parse_tempo(raw.goal_tempo).unwrap_or(Tempo::new(DEFAULT_GOAL_BPM));

    let parts = raw
        .parts
        .unwrap_or_default()
        .into_iter()
        .map(|part| normalize_part(part, id, goal_tempo))
        .collect();

    Song {
        id,
        title: raw.title.unwrap_or_else(|| "Untitled Song".to_string()),
        goal_tempo,
        last_part_id: parse_id(raw.last_part_id),
        parts,
    }
}

fn normalize_part(raw: RawPart, song_id: Uuid, goal_tempo: Tempo) -> Part {
    let working_tempo = parse_tempo(raw.working_tempo).unwrap_or(goal_tempo);

    let raw_bars = raw.bars.unwrap_or_default();
    let bars: Vec<Bar> = if raw_bars.is_empty() {
        vec![Bar::empty(), Bar::empty()]
    } else {
        raw_bars.into_iter().map(normalize_bar).collect()
    };

    Part::from_parts(
        id_or_new(raw.id),
        song_id,
        raw.title.unwrap_or_else(|| "New Part".to_string()),
        working_tempo,
        LearntState::from_label(raw.learnt_state.as_deref().unwrap_or("")),
        bars,
    )
}

fn normalize_bar(raw: RawBar) -> Bar {
    let mut bar = Bar::empty();
    bar.id = id_or_new(raw.id);
    bar.note = raw.note.unwrap_or_default();
    bar.grid = normalize_grid(raw.grid);
    bar
}

/// A grid must have exactly one row per string; anything else is rebuilt
/// empty. Rows are padded or truncated to the fixed resolution, and only
/// finite numeric cells survive, clamped to the fret range.
fn normalize_grid(raw: Option<Vec<Vec<Value>>>) -> Grid {
    let mut grid = Grid::empty();
    let Some(rows) = raw else {
        return grid;
    };
    if rows.len() != STRING_COUNT {
        return grid;
    }

    for (string_index, row) in rows.into_iter().enumerate() {
        for (step_index, cell) in row.into_iter().take(RESOLUTION).enumerate() {
            if let Some(value) = cell.as_f64()
                && value.is_finite()
            {
                grid.set(string_index, step_index, Some(clamp_fret(value)));
            }
        }
    }
    grid
}
