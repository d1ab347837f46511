//! Writing-style inference used to steer the tone of replies
//!
//! The analyzer looks at three surface signals in a user's message and turns
//! each into an instruction clause for the reasoning service:
//!
//! 1. emoji density
//! 2. exclamation density
//! 3. average sentence length
//!
//! Clauses are evaluated in that fixed order so identical input always yields
//! an identical directive.

use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on a directive embedded in an outbound request (in characters)
pub const MAX_STYLE_CHARS: usize = 200;

/// Preamble asking the reasoning service to mirror the user's tone
const PREAMBLE: &str = "Пожалуйста, ответь в том же стиле, что и пользователь.";

const MANY_EMOJI: &str = "Используй много эмодзи.";
const SOME_EMOJI: &str = "Используй эмодзи умеренно.";
const VERY_EMPHATIC: &str = "Будь очень эмоциональным.";
const EMPHATIC: &str = "Будь эмоциональным.";
const SHORT_SENTENCES: &str = "Используй короткие предложения.";
const LONG_SENTENCES: &str = "Используй длинные предложения.";
const NEUTRAL: &str = "Общайся в нейтральном стиле.";

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Surface statistics of a text sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleMetrics {
    /// Number of emoji code points
    pub emoji: usize,
    /// Number of `!` characters
    pub exclamations: usize,
    /// Mean word count per sentence segment
    pub avg_sentence_words: f64,
}

impl StyleMetrics {
    /// Measure a text sample
    #[must_use]
    pub fn measure(text: &str) -> Self {
        let emoji = text.chars().filter(|c| is_emoji(*c)).count();
        let exclamations = text.chars().filter(|c| *c == '!').count();

        // Empty trailing segments count toward the divisor
        let segments: Vec<&str> = SENTENCE_BREAK.split(text).collect();
        let words: usize = segments.iter().map(|s| s.split_whitespace().count()).sum();

        #[allow(clippy::cast_precision_loss)]
        let avg_sentence_words = if segments.is_empty() {
            0.0
        } else {
            words as f64 / segments.len() as f64
        };

        Self {
            emoji,
            exclamations,
            avg_sentence_words,
        }
    }

    /// Instruction clauses triggered by these metrics, in evaluation order
    #[must_use]
    pub fn clauses(&self) -> Vec<&'static str> {
        let mut clauses = Vec::with_capacity(3);

        match self.emoji {
            0 => {}
            1..=2 => clauses.push(SOME_EMOJI),
            _ => clauses.push(MANY_EMOJI),
        }

        match self.exclamations {
            0 => {}
            1..=3 => clauses.push(EMPHATIC),
            _ => clauses.push(VERY_EMPHATIC),
        }

        if self.avg_sentence_words < 5.0 {
            clauses.push(SHORT_SENTENCES);
        } else if self.avg_sentence_words > 15.0 {
            clauses.push(LONG_SENTENCES);
        }

        if clauses.is_empty() {
            clauses.push(NEUTRAL);
        }

        clauses
    }
}

/// Derive a style directive from a user's message
///
/// Total and deterministic: every input, including the empty string, yields a
/// non-empty directive.
#[must_use]
pub fn analyze(text: &str) -> String {
    let clauses = StyleMetrics::measure(text).clauses();
    format!("{PREAMBLE} {}", clauses.join(" "))
}

/// Clamp a directive to [`MAX_STYLE_CHARS`] characters
///
/// Counts Unicode scalar values, so multi-byte text is never split mid-character.
#[must_use]
pub fn bounded(directive: &str) -> &str {
    match directive.char_indices().nth(MAX_STYLE_CHARS) {
        Some((idx, _)) => &directive[..idx],
        None => directive,
    }
}

/// Graphical emoji blocks (pictographs, emoticons, transport, dingbats, flags)
const fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F900..=0x1F9FF
            | 0x1FA70..=0x1FAFF
            | 0x1F1E6..=0x1F1FF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
    )
}
