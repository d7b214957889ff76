use crate::dsp::{BiquadFilter, EnvelopeDetector};
use crate::interpret::{estimate_wpm, morse_interpret_timed};
use crate::stream::StreamingDecoder;
use crate::types::{BatchDecode, DetectorParams, MorseError};

/// Default bandpass placement for CW audio.
pub const FILTER_FREQ_HZ: f64 = 600.0;
pub const FILTER_Q: f64 = 5.0;

/// Detection thresholds: live capture runs hotter than file decodes, where
/// the whole recording is available and noise floors tend to be higher.
pub const LIVE_THRESHOLD: f32 = 0.01;
pub const BULK_THRESHOLD: f32 = 0.05;

fn detector_params(sample_rate: f64, threshold: f32) -> DetectorParams {
    DetectorParams {
        sample_rate,
        threshold,
        ..DetectorParams::default()
    }
}

/// Decode a complete mono float32 buffer in one pass: bandpass, envelope
/// edge detection, speed estimation, then character recovery.
///
/// Multi-channel audio must be downmixed by the caller first.
pub fn decode_buffer(samples: &[f32], sample_rate: f64) -> Result<BatchDecode, MorseError> {
    let mut filter = BiquadFilter::bandpass(FILTER_FREQ_HZ, sample_rate, FILTER_Q)?;
    let mut detector = EnvelopeDetector::new(&detector_params(sample_rate, BULK_THRESHOLD))?;

    let filtered: Vec<f32> = samples.iter().map(|&s| filter.process(s)).collect();
    let events = detector.detect_events(&filtered);

    let on_durations: Vec<f64> = events.iter().filter(|e| e.on).map(|e| e.seconds).collect();
    let wpm = estimate_wpm(&on_durations);
    log::debug!(
        "bulk decode: {} events, estimated {:.1} wpm",
        events.len(),
        wpm
    );

    let chars = morse_interpret_timed(&events, wpm)?;
    let text = chars.iter().map(|c| c.text.as_str()).collect();
    Ok(BatchDecode { text, chars, wpm })
}

/// Streaming decode pipeline for chunked live capture.
///
/// Owns the filter, the edge detector and the incremental decoder for the
/// life of one stream; their state carries across buffer boundaries, so a
/// tone split by a chunk edge decodes the same as an unbroken one. One
/// instance per stream, one thread at a time.
pub struct LiveDecoder {
    filter: BiquadFilter,
    detector: EnvelopeDetector,
    decoder: StreamingDecoder,
    sample_rate: f64,
}

impl LiveDecoder {
    pub fn new(wpm: f64) -> Result<Self, MorseError> {
        Ok(Self {
            filter: BiquadFilter::default(),
            detector: EnvelopeDetector::new(&detector_params(44100.0, LIVE_THRESHOLD))?,
            decoder: StreamingDecoder::new(wpm)?,
            sample_rate: 0.0,
        })
    }

    /// Process one capture buffer and return the text to append.
    ///
    /// The first buffer of a stream fixes the sample rate; a later rate
    /// change is treated as the start of a new stream.
    pub fn process_buffer(
        &mut self,
        samples: &[f32],
        sample_rate: f64,
    ) -> Result<String, MorseError> {
        if sample_rate != self.sample_rate {
            self.configure(sample_rate)?;
        }

        let mut out = String::new();
        for &sample in samples {
            let filtered = self.filter.process(sample);
            if let Some(event) = self.detector.push(filtered) {
                out.push_str(&self.decoder.process_event(event));
            }
        }
        // Let silence that is still open produce output between buffers
        out.push_str(
            &self
                .decoder
                .check_timeout(self.detector.current_silence_secs()),
        );
        Ok(out)
    }

    fn configure(&mut self, sample_rate: f64) -> Result<(), MorseError> {
        self.filter
            .set_bandpass(FILTER_FREQ_HZ, sample_rate, FILTER_Q)?;
        self.filter.reset();
        self.detector = EnvelopeDetector::new(&detector_params(sample_rate, LIVE_THRESHOLD))?;
        self.decoder.reset();
        self.sample_rate = sample_rate;
        log::debug!("live stream configured at {} Hz", sample_rate);
        Ok(())
    }

    pub fn set_wpm(&mut self, wpm: f64) -> Result<(), MorseError> {
        self.decoder.set_wpm(wpm)
    }

    pub fn wpm(&self) -> f64 {
        self.decoder.wpm()
    }

    /// Forget everything about the current stream. The next buffer starts
    /// a new one.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.detector.reset();
        self.decoder.reset();
        self.sample_rate = 0.0;
    }

    /// Length of the silence currently in progress inside the detector.
    pub fn current_silence_secs(&self) -> f64 {
        self.detector.current_silence_secs()
    }
}
