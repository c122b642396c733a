// Audio module - trigger sink interface, tone rendering, cpal output

pub mod output;
pub mod sink;
pub mod tone;

pub use output::{AudioError, AudioOutput, AudioSink, SampleClock};
pub use sink::{NullSink, RecordingSink, Tone, ToneShape, TriggerSink};
