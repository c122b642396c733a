// Song store - persistence boundary for the library
// The engines never touch this; the caller persists after mutations

pub mod document;
pub mod file;

pub use file::JsonFileStore;

use crate::model::song::Library;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no user data directory available")]
    NoDataDir,
}

/// Where the library lives between sessions.
pub trait SongStore {
    /// Load the library. Missing or unreadable data degrades to the demo
    /// library rather than failing the whole load.
    fn load(&self) -> Result<Library, StoreError>;

    /// Persist the library.
    fn save(&self, library: &Library) -> Result<(), StoreError>;
}
