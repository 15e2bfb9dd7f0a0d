//! Gap-based speaker tagging.
//!
//! Attributes each timed word to a speaker using the silence between words:
//! a gap longer than [`SPEAKER_GAP_SECONDS`] is taken as a turn change and
//! the tag advances round-robin through the configured speaker set. This is
//! a deterministic placeholder, not diarization: the same words always get
//! the same tags, but the attribution itself is approximate.

use crate::transcription::WordTiming;

/// Pause length treated as a speaker change, in seconds.
pub const SPEAKER_GAP_SECONDS: f64 = 2.0;

const DEFAULT_SPEAKER: &str = "Speaker 1";

/// Assigns a speaker tag to every word, in time order.
///
/// With an empty speaker set every word receives the single default tag.
pub fn assign_speakers(words: &mut [WordTiming], speakers: &[String]) {
    if words.is_empty() {
        return;
    }

    let roster: Vec<String> = if speakers.is_empty() {
        vec![DEFAULT_SPEAKER.to_string()]
    } else {
        speakers.to_vec()
    };

    let mut current = 0usize;
    let mut previous_end: Option<f64> = None;

    for word in words.iter_mut() {
        if let Some(end) = previous_end {
            if word.start - end > SPEAKER_GAP_SECONDS {
                current = (current + 1) % roster.len();
            }
        }
        word.speaker = Some(roster[current].clone());
        previous_end = Some(word.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> WordTiming {
        WordTiming {
            text: text.to_string(),
            start,
            end,
            speaker: None,
        }
    }

    #[test]
    fn test_small_gaps_keep_a_single_speaker() {
        let mut words = vec![
            word("bonjour", 0.0, 0.4),
            word("le", 0.5, 0.6),
            word("monde", 2.1, 2.5),
        ];
        assign_speakers(&mut words, &["Alice".to_string(), "Bob".to_string()]);
        for w in &words {
            assert_eq!(w.speaker.as_deref(), Some("Alice"));
        }
    }

    #[test]
    fn test_long_gap_advances_round_robin() {
        let mut words = vec![
            word("bonjour", 0.0, 0.4),
            word("oui", 3.0, 3.2),   // 2.6s gap
            word("merci", 6.0, 6.3), // 2.8s gap
            word("au revoir", 9.0, 9.5),
        ];
        assign_speakers(&mut words, &["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(words[0].speaker.as_deref(), Some("Alice"));
        assert_eq!(words[1].speaker.as_deref(), Some("Bob"));
        assert_eq!(words[2].speaker.as_deref(), Some("Alice"));
        assert_eq!(words[3].speaker.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_empty_speaker_set_uses_default_tag() {
        let mut words = vec![word("bonjour", 0.0, 0.4), word("monde", 5.0, 5.4)];
        assign_speakers(&mut words, &[]);
        for w in &words {
            assert_eq!(w.speaker.as_deref(), Some(DEFAULT_SPEAKER));
        }
    }

    #[test]
    fn test_tagging_is_deterministic() {
        let build = || {
            vec![
                word("un", 0.0, 0.2),
                word("deux", 4.0, 4.2),
                word("trois", 8.0, 8.2),
            ]
        };
        let roster = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let mut first = build();
        let mut second = build();
        assign_speakers(&mut first, &roster);
        assign_speakers(&mut second, &roster);
        assert_eq!(first, second);
    }
}
