use crate::types::{ensure_positive, DetectorParams, MorseError, MorseSignal};
use std::f64::consts::PI;

/// Second-order IIR bandpass filter (constant 0 dB peak gain form).
///
/// Direct Form I with `a*` numerator and `b*` denominator coefficients.
/// Coefficients and history are kept in f64 even though the sample stream
/// is f32. Reconfiguring replaces the coefficients without touching the
/// history; only `reset` clears it.
#[derive(Clone, Default)]
pub struct BiquadFilter {
    a0: f64,
    a1: f64,
    a2: f64,
    b1: f64,
    b2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadFilter {
    pub fn bandpass(freq_hz: f64, sample_rate: f64, q: f64) -> Result<Self, MorseError> {
        let mut filter = Self::default();
        filter.set_bandpass(freq_hz, sample_rate, q)?;
        Ok(filter)
    }

    /// Recompute coefficients for a new center/rate/Q. History is preserved.
    pub fn set_bandpass(
        &mut self,
        freq_hz: f64,
        sample_rate: f64,
        q: f64,
    ) -> Result<(), MorseError> {
        let freq_hz = ensure_positive("freqHz", freq_hz)?;
        let sample_rate = ensure_positive("sampleRate", sample_rate)?;
        let q = ensure_positive("q", q)?;

        let w0 = 2.0 * PI * freq_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let norm = 1.0 + alpha;
        self.a0 = alpha / norm;
        self.a1 = 0.0;
        self.a2 = -alpha / norm;
        self.b1 = (-2.0 * cos_w0) / norm;
        self.b2 = (1.0 - alpha) / norm;
        Ok(())
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let x0 = input as f64;
        let output = self.a0 * x0 + self.a1 * self.x1 + self.a2 * self.x2
            - self.b1 * self.y1
            - self.b2 * self.y2;

        // Update state
        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = output;

        output as f32
    }

    /// Clear the filter history. Called whenever a new stream begins.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Peak-hold envelope follower with exponential release, thresholding and
/// glitch suppression. Emits `(duration, polarity)` events on confirmed
/// transitions.
///
/// A transition is confirmed only after the opposite polarity has persisted
/// longer than the minimum event duration; shorter excursions are absorbed
/// back into the surrounding run, so event durations always sum to the
/// processed audio time.
pub struct EnvelopeDetector {
    sample_rate: f64,
    threshold: f32,
    decay: f32,
    min_event_frames: u64,
    envelope: f32,
    signal_on: bool,
    run_frames: u64,
    pending_frames: u64,
}

impl EnvelopeDetector {
    pub fn new(params: &DetectorParams) -> Result<Self, MorseError> {
        let sample_rate = ensure_positive("sampleRate", params.sample_rate)?;
        let release = ensure_positive("releaseSecs", params.release_secs)?;
        let min_event = ensure_positive("minEventSecs", params.min_event_secs)?;

        Ok(Self {
            sample_rate,
            threshold: params.threshold,
            decay: (-1.0 / (sample_rate * release)).exp() as f32,
            min_event_frames: (min_event * sample_rate).round() as u64,
            envelope: 0.0,
            signal_on: false,
            run_frames: 0,
            pending_frames: 0,
        })
    }

    /// Feed one sample. Returns the run that just closed, if a transition
    /// was confirmed by this sample.
    pub fn push(&mut self, sample: f32) -> Option<MorseSignal> {
        let magnitude = sample.abs();
        if magnitude > self.envelope {
            self.envelope = magnitude; // instant attack
        } else {
            self.envelope *= self.decay;
        }

        let now_on = self.envelope > self.threshold;
        if now_on == self.signal_on {
            // Any shorter opposite excursion was a glitch; fold it back in.
            self.run_frames += 1 + self.pending_frames;
            self.pending_frames = 0;
            return None;
        }

        self.pending_frames += 1;
        if self.pending_frames <= self.min_event_frames {
            return None;
        }

        // The new polarity has persisted long enough: close the old run.
        let closed = MorseSignal {
            on: self.signal_on,
            seconds: self.run_frames as f64 / self.sample_rate,
        };
        self.signal_on = now_on;
        self.run_frames = self.pending_frames;
        self.pending_frames = 0;

        if closed.seconds > 0.0 {
            Some(closed)
        } else {
            None // stream opened mid-run, nothing to report
        }
    }

    /// Process a whole buffer and append the trailing run. Used by the bulk
    /// pipeline; live callers drive `push` directly.
    pub fn detect_events(&mut self, samples: &[f32]) -> Vec<MorseSignal> {
        let mut events = Vec::new();
        for &sample in samples {
            if let Some(event) = self.push(sample) {
                events.push(event);
            }
        }
        if let Some(event) = self.flush() {
            events.push(event);
        }
        events
    }

    /// Close and return the in-progress run, unconfirmed remainder included.
    pub fn flush(&mut self) -> Option<MorseSignal> {
        let frames = self.run_frames + self.pending_frames;
        self.run_frames = 0;
        self.pending_frames = 0;
        if frames == 0 {
            return None;
        }
        Some(MorseSignal {
            on: self.signal_on,
            seconds: frames as f64 / self.sample_rate,
        })
    }

    /// Length of the silence currently in progress, without closing it.
    /// Zero while a tone is sounding.
    pub fn current_silence_secs(&self) -> f64 {
        if self.signal_on {
            0.0
        } else {
            self.run_frames as f64 / self.sample_rate
        }
    }

    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
        self.signal_on = false;
        self.run_frames = 0;
        self.pending_frames = 0;
    }
}
