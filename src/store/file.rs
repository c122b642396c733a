// JSON file store - one pretty-printed document on disk

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::song::Library;

use super::document::{PersistedDocument, RawRoot, normalize};
use super::{SongStore, StoreError};

/// Library persisted as a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the platform's user data directory
    /// (e.g. `~/.local/share/fretpulse/library.json`)
    pub fn at_default_location() -> Result<Self, StoreError> {
        let base = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(base.join("fretpulse").join("library.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SongStore for JsonFileStore {
    fn load(&self) -> Result<Library, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Library::demo());
            }
            Err(err) => return Err(err.into()),
        };

        let library = match serde_json::from_str::<RawRoot>(&text) {
            Ok(root) => normalize(root),
            Err(err) => {
                eprintln!(
                    "Warning: could not parse {}, starting fresh ({err})",
                    self.path.display()
                );
                Library::demo()
            }
        };

        // An empty library is unusable; reseed like a first run
        if library.songs.is_empty() {
            return Ok(Library::demo());
        }
        Ok(library)
    }

    fn save(&self, library: &Library) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&PersistedDocument::of(library))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
