// WebAssembly bindings over cw-core using pure serde for zero-duplication
use cw_core::{audio, interpret, pipeline, timing, types::*, wav};
use wasm_bindgen::prelude::*;

pub mod support;
use support::{parse_with_defaults, to_js_error};

// Console logging for debugging
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

#[allow(unused_macros)]
macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Combined configuration for encoding, synthesis and decoding.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MorseConfig {
    pub wpm: f64,
    pub freq_hz: f64,
    pub sample_rate: f64,
}

impl Default for MorseConfig {
    fn default() -> Self {
        let audio_defaults = MorseAudioParams::default();
        Self {
            wpm: 20.0,
            freq_hz: audio_defaults.freq_hz,
            sample_rate: audio_defaults.sample_rate,
        }
    }
}

impl MorseConfig {
    fn to_audio_params(&self) -> MorseAudioParams {
        MorseAudioParams {
            freq_hz: self.freq_hz,
            sample_rate: self.sample_rate,
        }
    }
}

// Pure serde-based API functions that return JSON strings

/// Generate the on/off timing events for a text as JSON
#[wasm_bindgen]
pub fn morse_timing_json(text: &str, config_json: &str) -> Result<String, JsValue> {
    let config: MorseConfig = parse_with_defaults(config_json);
    let signals = timing::morse_timing(text, config.wpm).map_err(to_js_error)?;
    serde_json::to_string(&signals).map_err(to_js_error)
}

/// Generate keyed audio for a text as JSON (events, samples and duration)
#[wasm_bindgen]
pub fn morse_audio_json(text: &str, config_json: &str) -> Result<String, JsValue> {
    let config: MorseConfig = parse_with_defaults(config_json);

    let signals = timing::morse_timing(text, config.wpm).map_err(to_js_error)?;
    let params = config.to_audio_params();
    let samples = audio::morse_audio(&signals, &params).map_err(to_js_error)?;
    let duration: f64 = signals.iter().map(|s| s.seconds).sum();

    let result = serde_json::json!({
        "samples": samples,
        "sampleRate": params.sample_rate,
        "duration": duration,
        "signals": signals,
    });
    serde_json::to_string(&result).map_err(to_js_error)
}

/// Render a text straight to WAV bytes for download or playback
#[wasm_bindgen]
pub fn morse_wav(text: &str, config_json: &str) -> Result<Vec<u8>, JsValue> {
    let config: MorseConfig = parse_with_defaults(config_json);
    let signals = timing::morse_timing(text, config.wpm).map_err(to_js_error)?;
    let params = config.to_audio_params();
    let samples = audio::morse_audio(&signals, &params).map_err(to_js_error)?;
    wav::wav_bytes(&samples, params.sample_rate.round() as u32, 1).map_err(to_js_error)
}

/// Decode timing events from JSON at the configured speed
#[wasm_bindgen]
pub fn morse_interpret_json(signals_json: &str, config_json: &str) -> Result<String, JsValue> {
    let signals: Vec<MorseSignal> = serde_json::from_str(signals_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid signals JSON: {}", e)))?;
    let config: MorseConfig = parse_with_defaults(config_json);

    let chars = interpret::morse_interpret_timed(&signals, config.wpm).map_err(to_js_error)?;
    let text: String = chars.iter().map(|c| c.text.as_str()).collect();

    let result = serde_json::json!({
        "text": text,
        "chars": chars,
    });
    serde_json::to_string(&result).map_err(to_js_error)
}

// Alternative API using wasm-bindgen's direct serde integration

/// Generate timing events as a JsValue (direct serde integration)
#[wasm_bindgen]
pub fn morse_timing_direct(text: &str, config: &JsValue) -> Result<JsValue, JsValue> {
    let config: MorseConfig = if config.is_undefined() || config.is_null() {
        MorseConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config.clone())?
    };

    let signals = timing::morse_timing(text, config.wpm).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&signals).map_err(to_js_error)
}

/// Decode a whole sample buffer as a JsValue (direct serde integration)
#[wasm_bindgen]
pub fn morse_decode_buffer_direct(
    samples: &[f32],
    sample_rate: f64,
) -> Result<JsValue, JsValue> {
    let result = pipeline::decode_buffer(samples, sample_rate).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

/// Stateful live decoder handle for chunked capture from an audio worklet.
///
/// Filter, envelope and decoder state persist across `process` calls, so
/// the caller just forwards capture buffers and appends the returned text.
#[wasm_bindgen]
pub struct WasmLiveDecoder {
    inner: pipeline::LiveDecoder,
}

#[wasm_bindgen]
impl WasmLiveDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new(wpm: f64) -> Result<WasmLiveDecoder, JsValue> {
        Ok(Self {
            inner: pipeline::LiveDecoder::new(wpm).map_err(to_js_error)?,
        })
    }

    /// Feed one capture buffer, returning the decoded text to append
    pub fn process(&mut self, samples: &[f32], sample_rate: f64) -> Result<String, JsValue> {
        self.inner
            .process_buffer(samples, sample_rate)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setWpm)]
    pub fn set_wpm(&mut self, wpm: f64) -> Result<(), JsValue> {
        self.inner.set_wpm(wpm).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn wpm(&self) -> f64 {
        self.inner.wpm()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
