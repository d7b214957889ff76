use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A keyed-tone or silence interval, the currency of every pipeline stage.
///
/// `on == true` is a tone, `on == false` is silence. Sequences normally
/// alternate, but consumers tolerate adjacent same-polarity events by
/// composing their durations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorseSignal {
    pub on: bool,
    pub seconds: f64,
}

impl MorseSignal {
    pub fn tone(seconds: f64) -> Self {
        Self { on: true, seconds }
    }

    pub fn silence(seconds: f64) -> Self {
        Self { on: false, seconds }
    }
}

/// A decoded character together with the cumulative audio time at which its
/// terminating gap ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedChar {
    pub text: String,
    pub seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MorseAudioParams {
    pub freq_hz: f64,
    pub sample_rate: f64,
}

impl Default for MorseAudioParams {
    fn default() -> Self {
        Self {
            freq_hz: 600.0,
            sample_rate: 44100.0,
        }
    }
}

/// Configuration for the envelope follower and edge detector.
///
/// Attack is instant; `release_secs` is the exponential release time
/// constant. Polarity runs no longer than `min_event_secs` are treated as
/// glitches and absorbed into the surrounding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorParams {
    pub sample_rate: f64,
    pub threshold: f32,
    pub release_secs: f64,
    pub min_event_secs: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            threshold: 0.05,
            release_secs: 0.005,
            min_event_secs: 0.005,
        }
    }
}

/// Result of decoding a whole buffer in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDecode {
    pub text: String,
    pub chars: Vec<DecodedChar>,
    pub wpm: f64,
}

#[derive(Debug, Error)]
pub enum MorseError {
    #[error("invalid {name}: {value}")]
    Config { name: &'static str, value: f64 },

    #[error("{what} of {count} exceeds the addressable limit")]
    Overflow { what: &'static str, count: u64 },
}

/// Rejects non-positive or non-finite configuration values.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64, MorseError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MorseError::Config { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_json_deserialization() {
        // Empty JSON merges with defaults
        let params: MorseAudioParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.freq_hz, 600.0);
        assert_eq!(params.sample_rate, 44100.0);

        let params: MorseAudioParams =
            serde_json::from_str(r#"{"freqHz": 700, "sampleRate": 8000}"#).unwrap();
        assert_eq!(params.freq_hz, 700.0);
        assert_eq!(params.sample_rate, 8000.0);

        let params: DetectorParams = serde_json::from_str(r#"{"threshold": 0.01}"#).unwrap();
        assert_eq!(params.threshold, 0.01);
        assert_eq!(params.release_secs, 0.005); // default
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("wpm", 20.0).is_ok());
        assert!(ensure_positive("wpm", 0.0).is_err());
        assert!(ensure_positive("wpm", -3.0).is_err());
        assert!(ensure_positive("wpm", f64::NAN).is_err());
        assert!(ensure_positive("sampleRate", f64::INFINITY).is_err());
    }
}
