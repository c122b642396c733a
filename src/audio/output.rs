// Audio output - cpal stream mixing pre-rendered scheduled tones
// The stream's own sample counter is the playback clock, so tone start
// times land sample-accurately regardless of callback timing

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::Clock;

use super::sink::{Tone, TriggerSink};
use super::tone;

// Pending tones in flight between scheduler and callback. Playback commits
// at most a lookahead window of steps per poll, and a step triggers at most
// one tone per string plus a click, so this never fills in practice.
const TONE_QUEUE_CAPACITY: usize = 256;

/// Audio error types
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("audio configuration error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("could not build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("could not start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),
}

/// A tone rendered and queued for a precise start position
struct ScheduledTone {
    start_sample: u64,
    samples: Vec<f32>,
}

/// Clock derived from the stream's sample counter (seconds = samples/rate).
/// Cheap to clone and safe to read from any thread.
#[derive(Clone)]
pub struct SampleClock {
    position: Arc<AtomicU64>,
    sample_rate: f64,
}

impl SampleClock {
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn current_sample(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }
}

impl Clock for SampleClock {
    fn now(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }
}

/// The sending half of the output: renders tones and queues them for the
/// callback. Send-able, so a poll driver thread can own it while the stream
/// itself stays where it was created.
pub struct AudioSink {
    tone_tx: HeapProd<ScheduledTone>,
    sample_rate: f32,
}

impl TriggerSink for AudioSink {
    fn play_tone(&mut self, at: f64, tone: Tone) {
        let scheduled = ScheduledTone {
            start_sample: (at.max(0.0) * self.sample_rate as f64) as u64,
            samples: tone::render(&tone, self.sample_rate),
        };
        // Queue full means something upstream is wedged; dropping one tone
        // is better than blocking the scheduler
        let _ = self.tone_tx.try_push(scheduled);
    }

    fn flash_indicator(&mut self, _at: f64) {
        // Visual feedback belongs to the front-end; sound-only sink
    }
}

/// Owner of the cpal device and stream.
pub struct AudioOutput {
    _device: Device,
    stream: Stream,
    clock: SampleClock,
}

impl AudioOutput {
    /// Open the default output device and start mixing. Returns the output
    /// (keep it alive; dropping it kills the stream) and its sink half.
    pub fn open() -> Result<(Self, AudioSink), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let position = Arc::new(AtomicU64::new(0));
        let (tone_tx, tone_rx) = HeapRb::<ScheduledTone>::new(TONE_QUEUE_CAPACITY).split();

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, Arc::clone(&position), tone_rx)
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, Arc::clone(&position), tone_rx)
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, Arc::clone(&position), tone_rx)
            }
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;

        let clock = SampleClock {
            position,
            sample_rate: sample_rate as f64,
        };

        Ok((
            Self {
                _device: device,
                stream,
                clock,
            },
            AudioSink {
                tone_tx,
                sample_rate,
            },
        ))
    }

    /// Start (or resume) the stream. Idempotent; call before scheduling.
    pub fn ensure_started(&self) -> Result<(), AudioError> {
        self.stream.play()?;
        Ok(())
    }

    /// The stream's sample-counter clock. Scheduling against this clock is
    /// what makes tone start times sample-accurate.
    pub fn clock(&self) -> SampleClock {
        self.clock.clone()
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        position: Arc<AtomicU64>,
        mut tone_rx: HeapCons<ScheduledTone>,
    ) -> Result<Stream, cpal::BuildStreamError>
    where
        T: SizedSample + FromSample<f32>,
    {
        // Mix list lives in the callback; capacity covers a full queue so
        // the hot path never allocates
        let mut active: Vec<ScheduledTone> = Vec::with_capacity(TONE_QUEUE_CAPACITY);

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // No allocations, no I/O, no blocking in here
                while let Some(tone) = tone_rx.try_pop() {
                    if active.len() < active.capacity() {
                        active.push(tone);
                    }
                }

                let base = position.load(Ordering::Relaxed);
                let frames = data.len() / channels;

                for frame in 0..frames {
                    let pos = base + frame as u64;
                    let mut mix = 0.0f32;
                    for tone in &active {
                        if pos >= tone.start_sample {
                            let index = (pos - tone.start_sample) as usize;
                            if index < tone.samples.len() {
                                mix += tone.samples[index];
                            }
                        }
                    }

                    let value = T::from_sample(mix.clamp(-1.0, 1.0));
                    for channel in 0..channels {
                        data[frame * channels + channel] = value;
                    }
                }

                let end = base + frames as u64;
                active.retain(|tone| tone.start_sample + tone.samples.len() as u64 > end);
                position.fetch_add(frames as u64, Ordering::Relaxed);
            },
            move |err| {
                eprintln!("Audio stream error: {err}");
            },
            None,
        )?;

        Ok(stream)
    }
}
