use crate::patterns::get_pattern_char;
use crate::timing::{checked_wpm, unit_seconds, DOT_LENGTH_WPM, WPM_MAX, WPM_MIN};
use crate::types::{DecodedChar, MorseError, MorseSignal};

/// Default speed assumed when there is nothing to measure.
pub const DEFAULT_WPM: f64 = 20.0;

/// Duration thresholds derived from a unit time, shared by the batch and
/// streaming decoders.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Thresholds {
    /// On-durations below this are dots, above are dashes.
    pub dot_limit: f64,
    /// Silences above this end the current character.
    pub symbol_space: f64,
    /// Silences above this end the current word.
    pub word_space: f64,
}

impl Thresholds {
    pub fn for_wpm(wpm: f64) -> Self {
        let unit = unit_seconds(wpm);
        Self {
            dot_limit: 1.5 * unit,
            symbol_space: 2.0 * unit,
            word_space: 5.0 * unit,
        }
    }
}

/// Infer the sender's speed from a batch of tone durations.
///
/// Dots outnumber dashes in typical text, so the lower quartile of the
/// sorted durations is a robust dot-length proxy. The result is clamped to
/// the supported range; an empty batch reports the default speed.
pub fn estimate_wpm(on_durations: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = on_durations
        .iter()
        .copied()
        .filter(|d| d.is_finite() && *d > 0.0)
        .collect();
    if sorted.is_empty() {
        return DEFAULT_WPM;
    }

    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let dot_length = sorted[sorted.len() / 4];
    (DOT_LENGTH_WPM / dot_length).clamp(WPM_MIN, WPM_MAX)
}

/// Merge adjacent same-polarity events and drop degenerate durations, so
/// the state machine only ever sees alternating intervals.
fn compose(signals: &[MorseSignal]) -> Vec<MorseSignal> {
    let mut composed: Vec<MorseSignal> = Vec::with_capacity(signals.len());
    for signal in signals {
        if !signal.seconds.is_finite() || signal.seconds <= 0.0 {
            continue;
        }
        match composed.last_mut() {
            Some(last) if last.on == signal.on => last.seconds += signal.seconds,
            _ => composed.push(*signal),
        }
    }
    composed
}

fn flush_symbol(symbol: &mut String, out: &mut Vec<DecodedChar>, at: f64) {
    if symbol.is_empty() {
        return;
    }
    // Unknown patterns are dropped silently
    if let Some(ch) = get_pattern_char(symbol) {
        out.push(DecodedChar {
            text: ch.to_string(),
            seconds: at,
        });
    }
    symbol.clear();
}

/// Decode a finite event sequence at a known speed, keeping the time each
/// character was completed.
///
/// Timing noise never fails: unreadable stretches simply decode to nothing.
pub fn morse_interpret_timed(
    signals: &[MorseSignal],
    wpm: f64,
) -> Result<Vec<DecodedChar>, MorseError> {
    let thresholds = Thresholds::for_wpm(checked_wpm(wpm)?);

    let mut out = Vec::new();
    let mut symbol = String::new();
    let mut elapsed = 0.0f64;

    for signal in compose(signals) {
        elapsed += signal.seconds;
        if signal.on {
            symbol.push(if signal.seconds < thresholds.dot_limit {
                '.'
            } else {
                '-'
            });
        } else if signal.seconds > thresholds.word_space {
            flush_symbol(&mut symbol, &mut out, elapsed);
            let after_space = out.last().map(|c| c.text == " ").unwrap_or(true);
            if !after_space {
                out.push(DecodedChar {
                    text: " ".to_string(),
                    seconds: elapsed,
                });
            }
        } else if signal.seconds > thresholds.symbol_space {
            flush_symbol(&mut symbol, &mut out, elapsed);
        }
        // Shorter silences separate symbols within a character
    }

    flush_symbol(&mut symbol, &mut out, elapsed);
    Ok(out)
}

/// Decode a finite event sequence to plain text.
pub fn morse_interpret(signals: &[MorseSignal], wpm: f64) -> Result<String, MorseError> {
    let chars = morse_interpret_timed(signals, wpm)?;
    log::debug!("decoded {} characters at {} wpm", chars.len(), wpm);
    Ok(chars.iter().map(|c| c.text.as_str()).collect())
}
