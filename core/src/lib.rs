// CW signal processing and decoding core
// Audio in, text out; text in, keyed waveform out

pub mod audio;
pub mod dsp;
pub mod interpret;
pub mod patterns;
pub mod pipeline;
pub mod stream;
pub mod timing;
pub mod types;
pub mod wav;

// Re-export main public API
pub use audio::{morse_audio, morse_audio_size};
pub use dsp::{BiquadFilter, EnvelopeDetector};
pub use interpret::{estimate_wpm, morse_interpret, morse_interpret_timed};
pub use pipeline::{decode_buffer, LiveDecoder};
pub use stream::StreamingDecoder;
pub use timing::morse_timing;
pub use types::*;
pub use wav::wav_bytes;

/// Text straight to a playable WAV image: encode, synthesize, contain.
pub fn generate_morse_wav(
    text: &str,
    wpm: f64,
    params: &MorseAudioParams,
) -> Result<Vec<u8>, MorseError> {
    let signals = timing::morse_timing(text, wpm)?;
    let samples = audio::morse_audio(&signals, params)?;
    wav::wav_bytes(&samples, params.sample_rate.round() as u32, 1)
}
