// Tone rendering - scheduled tones pre-rendered to sample buffers
// Rendering happens at schedule time on the control thread; the audio
// callback only mixes finished buffers and never allocates

use super::sink::{Tone, ToneShape};

/// Click gain (constant over the burst)
const CLICK_GAIN: f32 = 0.2;

/// Pluck starting gain and the floor its exponential decay reaches
const PLUCK_GAIN: f32 = 0.18;
const PLUCK_FLOOR: f32 = 0.001;

/// Portion of the pluck spent decaying; the remainder rings at the floor
const PLUCK_DECAY_SECONDS: f32 = 0.35;

/// Render a tone into a mono buffer at `sample_rate`.
pub fn render(tone: &Tone, sample_rate: f32) -> Vec<f32> {
    let num_samples = (tone.duration as f32 * sample_rate) as usize;
    let mut samples = Vec::with_capacity(num_samples);
    let phase_increment = tone.frequency as f32 / sample_rate;

    let mut phase = 0.0f32;
    for i in 0..num_samples {
        let t = i as f32 / sample_rate;
        let (wave, envelope) = match tone.shape {
            ToneShape::Click => (square(phase), CLICK_GAIN * click_tail(i, num_samples)),
            ToneShape::Pluck => (triangle(phase), PLUCK_GAIN * pluck_decay(t)),
        };
        samples.push(wave * envelope);

        phase += phase_increment;
        if phase >= 1.0 {
            phase -= 1.0;
        }
    }

    samples
}

fn square(phase: f32) -> f32 {
    if phase < 0.5 { 1.0 } else { -1.0 }
}

fn triangle(phase: f32) -> f32 {
    if phase < 0.25 {
        4.0 * phase
    } else if phase < 0.75 {
        2.0 - 4.0 * phase
    } else {
        4.0 * phase - 4.0
    }
}

// Short linear fade over the last ~5 ms so the burst does not end on a
// discontinuity
fn click_tail(i: usize, num_samples: usize) -> f32 {
    let tail = (num_samples / 10).max(1);
    let remaining = num_samples - i;
    if remaining < tail {
        remaining as f32 / tail as f32
    } else {
        1.0
    }
}

fn pluck_decay(t: f32) -> f32 {
    if t >= PLUCK_DECAY_SECONDS {
        PLUCK_FLOOR / PLUCK_GAIN
    } else {
        (PLUCK_FLOOR / PLUCK_GAIN).powf(t / PLUCK_DECAY_SECONDS)
    }
}
