use crate::interpret::Thresholds;
use crate::patterns::get_pattern_char;
use crate::timing::checked_wpm;
use crate::types::{MorseError, MorseSignal};

/// Incremental decoder for live audio.
///
/// `process_event` consumes confirmed on/off transitions as the edge
/// detector reports them; `check_timeout` is polled with the still-open
/// silence so characters and word spaces appear without waiting for the
/// next keying. Emitted text is returned, never queued.
///
/// Word-space contract: exactly one space is emitted per word boundary,
/// whether the boundary is first seen by a closed silence event or by a
/// timeout poll, and even when the silence only grows past the word
/// threshold after the pending character was already flushed.
pub struct StreamingDecoder {
    symbol: String,
    wpm: f64,
    thresholds: Thresholds,
    word_space_pending: bool,
}

impl StreamingDecoder {
    pub fn new(wpm: f64) -> Result<Self, MorseError> {
        let wpm = checked_wpm(wpm)?;
        Ok(Self {
            symbol: String::new(),
            wpm,
            thresholds: Thresholds::for_wpm(wpm),
            word_space_pending: false,
        })
    }

    pub fn wpm(&self) -> f64 {
        self.wpm
    }

    /// Change speed without touching the symbol in progress.
    pub fn set_wpm(&mut self, wpm: f64) -> Result<(), MorseError> {
        self.wpm = checked_wpm(wpm)?;
        self.thresholds = Thresholds::for_wpm(self.wpm);
        Ok(())
    }

    /// Consume one confirmed transition. Returns the text to append, which
    /// is usually empty.
    pub fn process_event(&mut self, signal: MorseSignal) -> String {
        if !signal.seconds.is_finite() || signal.seconds <= 0.0 {
            return String::new();
        }
        if signal.on {
            self.word_space_pending = false;
            self.symbol.push(if signal.seconds < self.thresholds.dot_limit {
                '.'
            } else {
                '-'
            });
            return String::new();
        }
        self.handle_silence(signal.seconds)
    }

    /// Poll with the duration of the silence currently in progress.
    pub fn check_timeout(&mut self, silence_seconds: f64) -> String {
        if !silence_seconds.is_finite() || silence_seconds <= 0.0 {
            return String::new();
        }
        self.handle_silence(silence_seconds)
    }

    fn handle_silence(&mut self, seconds: f64) -> String {
        let mut out = String::new();
        if seconds > self.thresholds.word_space {
            let flushed = self.flush_symbol(&mut out);
            if flushed || self.word_space_pending {
                out.push(' ');
                self.word_space_pending = false;
            }
        } else if seconds > self.thresholds.symbol_space {
            // The character is complete; whether the word is over stays
            // open until the silence grows or keying resumes.
            if self.flush_symbol(&mut out) {
                self.word_space_pending = true;
            }
        }
        out
    }

    /// Appends the pending character, if it maps. Returns whether a symbol
    /// was pending at all.
    fn flush_symbol(&mut self, out: &mut String) -> bool {
        if self.symbol.is_empty() {
            return false;
        }
        if let Some(ch) = get_pattern_char(&self.symbol) {
            out.push(ch);
        }
        self.symbol.clear();
        true
    }

    pub fn reset(&mut self) {
        self.symbol.clear();
        self.word_space_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // wpm 12 puts the unit at a round 0.1 s
    fn decoder() -> StreamingDecoder {
        StreamingDecoder::new(12.0).unwrap()
    }

    fn feed(decoder: &mut StreamingDecoder, events: &[(f64, bool)]) -> String {
        let mut out = String::new();
        for &(seconds, on) in events {
            out.push_str(&decoder.process_event(MorseSignal { on, seconds }));
        }
        out
    }

    #[test]
    fn test_stream_decode_sos() {
        let mut dec = decoder();
        let mut out = feed(
            &mut dec,
            &[
                (0.1, true),
                (0.1, false),
                (0.1, true),
                (0.1, false),
                (0.1, true),
                (0.3, false),
                (0.3, true),
                (0.1, false),
                (0.3, true),
                (0.1, false),
                (0.3, true),
                (0.3, false),
                (0.1, true),
                (0.1, false),
                (0.1, true),
                (0.1, false),
                (0.1, true),
            ],
        );
        out.push_str(&dec.check_timeout(0.25));
        assert_eq!(out, "SOS");
    }

    #[test]
    fn test_timeout_flushes_pending_character() {
        let mut dec = decoder();
        feed(&mut dec, &[(0.1, true)]);
        assert_eq!(dec.check_timeout(0.15), "");
        assert_eq!(dec.check_timeout(0.25), "E");
        assert_eq!(dec.check_timeout(0.3), "");
    }

    #[test]
    fn test_word_space_emitted_once_as_silence_grows() {
        let mut dec = decoder();
        feed(&mut dec, &[(0.1, true)]);
        // The character flushes at the symbol-space threshold, and the
        // space still arrives when the same silence crosses the word
        // threshold later.
        assert_eq!(dec.check_timeout(0.25), "E");
        assert_eq!(dec.check_timeout(0.4), "");
        assert_eq!(dec.check_timeout(0.6), " ");
        assert_eq!(dec.check_timeout(0.9), "");
        assert_eq!(dec.check_timeout(5.0), "");
    }

    #[test]
    fn test_word_space_not_repeated_by_closing_event() {
        let mut dec = decoder();
        feed(&mut dec, &[(0.1, true)]);
        assert_eq!(dec.check_timeout(0.25), "E");
        assert_eq!(dec.check_timeout(0.6), " ");
        // Keying resumes: the closed silence must not emit a second space
        let out = feed(&mut dec, &[(0.7, false), (0.1, true)]);
        assert_eq!(out, "");
        assert_eq!(dec.check_timeout(0.25), "E");
    }

    #[test]
    fn test_word_space_from_closed_event_alone() {
        let mut dec = decoder();
        let out = feed(&mut dec, &[(0.1, true), (0.7, false), (0.1, true)]);
        assert_eq!(out, "E ");
        assert_eq!(dec.check_timeout(0.25), "E");
    }

    #[test]
    fn test_no_leading_space_from_initial_silence() {
        let mut dec = decoder();
        assert_eq!(dec.check_timeout(3.0), "");
        assert_eq!(feed(&mut dec, &[(5.0, false)]), "");
    }

    #[test]
    fn test_unknown_symbol_dropped_on_flush() {
        let mut dec = decoder();
        for _ in 0..8 {
            feed(&mut dec, &[(0.1, true), (0.1, false)]);
        }
        assert_eq!(dec.check_timeout(0.25), "");
        assert_eq!(dec.check_timeout(0.6), " "); // boundary still counts
    }

    #[test]
    fn test_set_wpm_keeps_pending_symbol() {
        let mut dec = decoder();
        feed(&mut dec, &[(0.1, true), (0.1, false), (0.1, true)]);
        dec.set_wpm(24.0).unwrap();
        // unit halves, so the old intra-character gap is now a flush
        assert_eq!(dec.check_timeout(0.15), "I");
    }

    #[test]
    fn test_set_wpm_rejects_invalid() {
        let mut dec = decoder();
        assert!(dec.set_wpm(0.0).is_err());
        assert!(dec.set_wpm(f64::NEG_INFINITY).is_err());
        assert!(StreamingDecoder::new(-1.0).is_err());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut dec = decoder();
        feed(&mut dec, &[(0.1, true)]);
        dec.reset();
        assert_eq!(dec.check_timeout(10.0), "");
    }
}
