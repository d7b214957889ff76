use crate::types::{ensure_positive, MorseAudioParams, MorseError, MorseSignal};
use std::f64::consts::PI;

// Audio constants
const RAMP_SECS: f64 = 0.005; // linear attack/release to prevent key clicks
const AMPLITUDE: f64 = 32000.0; // headroom below i16::MAX
const MAX_FRAMES: u64 = u32::MAX as u64;

fn event_frames(seconds: f64, sample_rate: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * sample_rate).round() as u64
    } else {
        0
    }
}

/// Total number of frames the given events render to, without rendering.
pub fn morse_audio_size(
    signals: &[MorseSignal],
    params: &MorseAudioParams,
) -> Result<usize, MorseError> {
    let sample_rate = ensure_positive("sampleRate", params.sample_rate)?;
    ensure_positive("freqHz", params.freq_hz)?;

    let mut total: u64 = 0;
    for signal in signals {
        total = total.saturating_add(event_frames(signal.seconds, sample_rate));
        if total > MAX_FRAMES {
            return Err(MorseError::Overflow {
                what: "frame count",
                count: total,
            });
        }
    }
    Ok(total as usize)
}

/// Render an event sequence as mono 16-bit PCM.
///
/// The sine phase runs on a global frame counter so adjacent tones stay
/// phase coherent across the silences between them. Each tone is shaped by
/// a linear attack and release, clamped to half the tone, whose first and
/// last samples are exactly zero.
pub fn morse_audio(
    signals: &[MorseSignal],
    params: &MorseAudioParams,
) -> Result<Vec<i16>, MorseError> {
    let total = morse_audio_size(signals, params)?;
    let sample_rate = params.sample_rate;
    let freq_hz = params.freq_hz;

    let omega = 2.0 * PI * freq_hz / sample_rate;
    let full_ramp = (RAMP_SECS * sample_rate).round() as u64;

    let mut samples = Vec::with_capacity(total);
    let mut frame: u64 = 0;

    for signal in signals {
        let n = event_frames(signal.seconds, sample_rate);

        if !signal.on {
            samples.resize(samples.len() + n as usize, 0i16);
            frame += n;
            continue;
        }

        let ramp = full_ramp.min(n / 2);
        for i in 0..n {
            let envelope = if ramp == 0 {
                1.0
            } else if i < ramp {
                i as f64 / ramp as f64
            } else if i >= n - ramp {
                (n - 1 - i) as f64 / ramp as f64
            } else {
                1.0
            };
            let sine = (omega * (frame + i) as f64).sin();
            samples.push((sine * envelope * AMPLITUDE).round() as i16);
        }
        frame += n;
    }

    Ok(samples)
}
