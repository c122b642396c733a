//! Store round-trip and normalization robustness
//!
//! Loads are allowed to be handed anything - missing files, truncated JSON,
//! documents from older versions, hand-edited grids - and must always come
//! back with a usable, fully-shaped library.

use fretpulse::model::grid::{RESOLUTION, STRING_COUNT};
use fretpulse::model::part::LearntState;
use fretpulse::model::song::Library;
use fretpulse::sequencer::tempo::Tempo;
use fretpulse::store::{JsonFileStore, SongStore};
use std::fs;
use tempfile::tempdir;

fn store_at(dir: &tempfile::TempDir, name: &str) -> JsonFileStore {
    JsonFileStore::new(dir.path().join(name))
}

#[test]
fn full_round_trip_preserves_everything() {
    let dir = tempdir().unwrap();
    let store = store_at(&dir, "library.json");

    let mut library = Library::demo();
    {
        let song = &mut library.songs[0];
        song.goal_tempo = Tempo::new(140);
        let part = &mut song.parts[0];
        part.learnt_state = LearntState::Learnt;
        part.bars_mut()[1].grid.set(0, 63, Some(24));
        part.bars_mut()[1].note = "let it ring".to_string();
    }

    store.save(&library).unwrap();
    let reloaded = store.load().unwrap();

    assert_eq!(reloaded, library);
    // And a second cycle is stable
    store.save(&reloaded).unwrap();
    assert_eq!(store.load().unwrap(), reloaded);
}

#[test]
fn missing_file_seeds_demo() {
    let dir = tempdir().unwrap();
    let store = store_at(&dir, "absent.json");

    let library = store.load().unwrap();
    assert_eq!(library.songs.len(), 1);
    assert!(library.active_part().is_some());
}

#[test]
fn garbage_file_seeds_demo() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");
    fs::write(&path, "garbage } [ 12").unwrap();

    let library = JsonFileStore::new(path).load().unwrap();
    assert_eq!(library.songs[0].title, "Sample Song");
}

#[test]
fn hand_edited_document_is_normalized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");
    fs::write(
        &path,
        r#"{
            "songs": [
                {
                    "title": "Hand Edited",
                    "goal_tempo": 9000,
                    "parts": [
                        {
                            "title": "Weird",
                            "working_tempo": "not a number",
                            "learnt_state": "mastered",
                            "bars": [
                                { "grid": [[0, 1], [2]] },
                                { "grid": null }
                            ]
                        }
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    let library = JsonFileStore::new(path).load().unwrap();
    let song = &library.songs[0];
    assert_eq!(song.goal_tempo.bpm(), Tempo::MAX_BPM);

    let part = &song.parts[0];
    // Unusable working tempo falls back to the song goal
    assert_eq!(part.working_tempo.bpm(), Tempo::MAX_BPM);
    // Unknown learnt label falls back to the default
    assert_eq!(part.learnt_state, LearntState::Learning);

    // Both malformed grids came back empty but correctly shaped
    assert_eq!(part.bar_count(), 2);
    for bar in part.bars() {
        assert_eq!(bar.resolution, RESOLUTION);
        assert!(bar.grid.is_silent());
    }
}

#[test]
fn legacy_camel_case_document_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");

    // Shape an older export would have written
    let mut grid_rows = String::new();
    for string_index in 0..STRING_COUNT {
        if string_index > 0 {
            grid_rows.push(',');
        }
        grid_rows.push_str("[3, null, null]");
    }
    fs::write(
        &path,
        format!(
            r#"{{
                "songs": [
                    {{
                        "id": "8c3f2a1e-7b6d-4e5f-9a0b-1c2d3e4f5a6b",
                        "title": "Legacy Song",
                        "goalBpm": 82,
                        "lastPartId": null,
                        "parts": [
                            {{
                                "title": "Legacy Part",
                                "workingBpm": 62,
                                "learntState": "learnt",
                                "bars": [ {{ "grid": [{grid_rows}] }} ]
                            }}
                        ]
                    }}
                ],
                "activeSongId": "8c3f2a1e-7b6d-4e5f-9a0b-1c2d3e4f5a6b"
            }}"#
        ),
    )
    .unwrap();

    let library = JsonFileStore::new(path).load().unwrap();
    let song = &library.songs[0];
    assert_eq!(song.title, "Legacy Song");
    assert_eq!(
        song.id.to_string(),
        "8c3f2a1e-7b6d-4e5f-9a0b-1c2d3e4f5a6b"
    );
    assert_eq!(library.active_song_id, Some(song.id));

    let part = &song.parts[0];
    assert_eq!(part.working_tempo.bpm(), 62);
    assert_eq!(part.learnt_state, LearntState::Learnt);
    // Short rows were padded out to full resolution
    assert_eq!(part.bars()[0].grid.get(0, 0), Some(3));
    assert_eq!(part.bars()[0].grid.get(0, RESOLUTION - 1), None);
    // The active part selection was repaired to the only part
    assert_eq!(library.active_part_id, Some(part.id));
}

#[test]
fn bare_array_document_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");
    fs::write(
        &path,
        r#"[ { "title": "Very Old", "parts": [ { "title": "Only" } ] } ]"#,
    )
    .unwrap();

    let library = JsonFileStore::new(path).load().unwrap();
    assert_eq!(library.songs[0].title, "Very Old");
    // Selection materialized from nothing
    assert!(library.active_part().is_some());
    // The part got the standard two empty bars
    assert_eq!(library.songs[0].parts[0].bar_count(), 2);
}

#[test]
fn saved_document_carries_version_and_timestamp() {
    let dir = tempdir().unwrap();
    let store = store_at(&dir, "library.json");
    store.save(&Library::demo()).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["version"], 1);
    assert!(value["saved_at"].as_str().unwrap().contains('T'));
}
