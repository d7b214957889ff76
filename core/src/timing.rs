use crate::patterns::get_morse_pattern;
use crate::types::{ensure_positive, MorseError, MorseSignal};

// ITU timing constants
pub const DOT_LENGTH_WPM: f64 = 1.2; // dot duration = 1.2 / WPM seconds
const UNITS_PER_DASH: f64 = 3.0; // dash = 3 dot durations
const UNITS_PER_CHAR_GAP: f64 = 3.0; // inter-character gap = 3 dot durations
const UNITS_PER_WORD_GAP: f64 = 7.0; // inter-word gap = 7 dot durations

pub const WPM_MIN: f64 = 5.0;
pub const WPM_MAX: f64 = 60.0;

/// Validate a WPM value and clamp it to the supported range.
pub fn checked_wpm(wpm: f64) -> Result<f64, MorseError> {
    Ok(ensure_positive("wpm", wpm)?.clamp(WPM_MIN, WPM_MAX))
}

/// The fundamental timing quantum for a given speed.
pub fn unit_seconds(wpm: f64) -> f64 {
    DOT_LENGTH_WPM / wpm
}

/// Generate the on/off event sequence for a text at the given speed.
///
/// Characters missing from the code table are skipped. Each character ends
/// in a 3-unit gap; a space contributes a further 4 units so that word gaps
/// come out at the standard 7. The trailing 3-unit silence after the last
/// character is kept.
pub fn morse_timing(text: &str, wpm: f64) -> Result<Vec<MorseSignal>, MorseError> {
    let unit = unit_seconds(checked_wpm(wpm)?);
    let mut signals = Vec::new();

    for ch in text.bytes() {
        // Spaces widen the preceding 3-unit character gap to a word gap
        if ch == b' ' {
            signals.push(MorseSignal::silence(
                unit * (UNITS_PER_WORD_GAP - UNITS_PER_CHAR_GAP),
            ));
            continue;
        }

        let Some(pattern) = get_morse_pattern(ch.to_ascii_lowercase()) else {
            continue;
        };

        for symbol in pattern.bytes() {
            let length = if symbol == b'.' {
                unit
            } else {
                unit * UNITS_PER_DASH
            };
            signals.push(MorseSignal::tone(length));
            signals.push(MorseSignal::silence(unit));
        }

        // Widen the final 1-unit symbol gap into the inter-character gap
        if let Some(last) = signals.last_mut() {
            last.seconds += unit * (UNITS_PER_CHAR_GAP - 1.0);
        }
    }

    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn total_seconds(signals: &[MorseSignal]) -> f64 {
        signals.iter().map(|s| s.seconds).sum()
    }

    #[test]
    fn test_single_dot_character() {
        // E is a single dot: one unit on, three units off
        let signals = morse_timing("E", 12.0).unwrap();
        let unit = unit_seconds(12.0);
        assert_eq!(signals.len(), 2);
        assert!(signals[0].on);
        assert!((signals[0].seconds - unit).abs() < EPS);
        assert!(!signals[1].on);
        assert!((signals[1].seconds - 3.0 * unit).abs() < EPS);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(morse_timing("sos", 20.0).unwrap(), morse_timing("SOS", 20.0).unwrap());
    }

    #[test]
    fn test_wpm_affects_timing() {
        let fast = morse_timing("E", 40.0).unwrap();
        let slow = morse_timing("E", 10.0).unwrap();
        assert!(fast[0].seconds < slow[0].seconds);
    }

    #[test]
    fn test_paris_is_fifty_units() {
        // The canonical reference word: 43 units of keying and gaps, the
        // trailing character gap, and a word space make 50.
        let wpm = 20.0;
        let unit = unit_seconds(wpm);
        let signals = morse_timing("PARIS ", wpm).unwrap();
        assert!((total_seconds(&signals) - 50.0 * unit).abs() < 1e-6);
    }

    #[test]
    fn test_word_gap_composes_to_seven_units() {
        let wpm = 12.0;
        let unit = unit_seconds(wpm);
        let signals = morse_timing("E E", wpm).unwrap();
        // dot, 3u gap, 4u gap, dot, 3u gap
        assert_eq!(signals.len(), 5);
        let mid_silence: f64 = signals[1].seconds + signals[2].seconds;
        assert!((mid_silence - 7.0 * unit).abs() < EPS);
    }

    #[test]
    fn test_unmapped_characters_are_skipped() {
        let plain = morse_timing("ab", 20.0).unwrap();
        let noisy = morse_timing("a#%b", 20.0).unwrap();
        assert_eq!(plain, noisy);
    }

    #[test]
    fn test_empty_text() {
        assert!(morse_timing("", 20.0).unwrap().is_empty());
        assert!(morse_timing("#@%", 20.0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_wpm() {
        assert!(morse_timing("E", 0.0).is_err());
        assert!(morse_timing("E", -5.0).is_err());
        assert!(morse_timing("E", f64::NAN).is_err());
    }

    #[test]
    fn test_wpm_clamped_to_range() {
        // 1000 WPM clamps to 60
        let signals = morse_timing("E", 1000.0).unwrap();
        assert!((signals[0].seconds - unit_seconds(WPM_MAX)).abs() < EPS);
        let signals = morse_timing("E", 1.0).unwrap();
        assert!((signals[0].seconds - unit_seconds(WPM_MIN)).abs() < EPS);
    }
}
