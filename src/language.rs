//! Supported interface languages

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Language a user can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl Language {
    /// Every selectable language
    pub const ALL: [Self; 2] = [Self::Ru, Self::En];

    /// Two-letter code stored in the profile
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
        }
    }

    /// Tesseract traineddata name
    #[must_use]
    pub const fn ocr_code(self) -> &'static str {
        match self {
            Self::Ru => "rus",
            Self::En => "eng",
        }
    }

    /// Parse user input: trimmed, case-insensitive two-letter code
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let folded = input.trim().to_lowercase();
        Self::ALL.into_iter().find(|l| l.code() == folded)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::Config(format!("unsupported language: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse("  ru \n"), Some(Language::Ru));
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(Language::parse("fr"), None);
        assert_eq!(Language::parse(""), None);
        assert_eq!(Language::parse("english"), None);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn code_round_trips() {
        for lang in Language::ALL {
            assert_eq!(Language::parse(lang.code()), Some(lang));
        }
    }
}
