//! Keyword-based subject classification
//!
//! Picks the tutoring template for a task. Matching is plain substring
//! containment on the case-folded text, so keywords are word stems that
//! survive Russian inflection ("производн" matches "производную").

use std::fmt;

/// Coarse topic of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Physics,
    Chemistry,
    Mathematics,
    /// Fallback when no keyword matched
    General,
}

impl Subject {
    /// Scored subjects in tie-break priority order
    pub const SCORED: [Self; 3] = [Self::Physics, Self::Chemistry, Self::Mathematics];

    /// Keyword stems counted for this subject
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Physics => &[
                "сила", "скорост", "ускорени", "энерги", "закон", "force", "velocity",
                "acceleration", "energy",
            ],
            Self::Chemistry => &[
                "молекул", "атом", "реакци", "валентн", "молярн", "molecule", "atom", "reaction",
                "valence", "molar",
            ],
            Self::Mathematics => &[
                "функци", "производн", "интеграл", "уравнени", "теорем", "function",
                "derivative", "integral", "equation", "theorem",
            ],
            Self::General => &[],
        }
    }

    /// Stable tag name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::Mathematics => "mathematics",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count how many of a subject's keywords occur in already case-folded text
fn score(subject: Subject, folded: &str) -> usize {
    subject
        .keywords()
        .iter()
        .filter(|kw| folded.contains(*kw))
        .count()
}

/// Classify a task by keyword hits
///
/// The highest score wins. Ties go to the earlier entry of
/// [`Subject::SCORED`]; a text with no hits at all is [`Subject::General`].
#[must_use]
pub fn classify(text: &str) -> Subject {
    let folded = text.to_lowercase();

    let mut best = Subject::General;
    let mut best_score = 0;
    for subject in Subject::SCORED {
        let s = score(subject, &folded);
        // Strict comparison keeps the earlier subject on ties
        if s > best_score {
            best = subject;
            best_score = s;
        }
    }

    best
}
