// Sequencer module - tempo, beat scheduling, and tablature playback

pub mod beat;
pub mod driver;
pub mod metronome;
pub mod playback;
pub mod scheduler;
pub mod tempo;

pub use beat::BeatTimes;
pub use driver::PollDriver;
pub use metronome::Metronome;
pub use playback::{PlayError, PlaybackCursor, PlaybackOptions, PlaybackState, TabPlayback};
pub use scheduler::{LookaheadScheduler, POLL_INTERVAL, SCHEDULE_AHEAD, START_GRACE};
pub use tempo::Tempo;
