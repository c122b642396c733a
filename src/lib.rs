// FretPulse - practice tracker playback engine for tablature grids

pub mod audio;
pub mod clock;
pub mod edit;
pub mod model;
pub mod sequencer;
pub mod session;
pub mod store;

// Re-export commonly used types for convenience
pub use audio::{AudioOutput, AudioSink, NullSink, Tone, TriggerSink};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use edit::{CellRef, ClickResult, GridEditor};
pub use model::{Bar, Grid, Library, Part, Song};
pub use sequencer::{
    BeatTimes, LookaheadScheduler, Metronome, PlayError, PlaybackOptions, PlaybackState,
    PollDriver, TabPlayback, Tempo,
};
pub use session::PracticeSession;
pub use store::{JsonFileStore, SongStore};
