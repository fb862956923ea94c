use rust_stemmers::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CopyglotError;

/// Target languages the translators accept.
///
/// Parsing accepts either the English name or the ISO 639-1 code, ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(alias = "es")]
    Spanish,
    #[serde(alias = "fr")]
    French,
    #[serde(alias = "de")]
    German,
    #[serde(alias = "ja")]
    Japanese,
    #[serde(alias = "ar")]
    Arabic,
    #[serde(alias = "hi")]
    Hindi,
    #[serde(alias = "pt")]
    Portuguese,
    #[serde(alias = "hu")]
    Hungarian,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Arabic,
        Language::Hindi,
        Language::Portuguese,
        Language::Hungarian,
    ];

    /// English name, as used in LLM prompts
    pub fn name(self) -> &'static str {
        match self {
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Japanese => "Japanese",
            Self::Arabic => "Arabic",
            Self::Hindi => "Hindi",
            Self::Portuguese => "Portuguese",
            Self::Hungarian => "Hungarian",
        }
    }

    /// ISO 639-1 code, as used by the baseline translator
    pub fn code(self) -> &'static str {
        match self {
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Japanese => "ja",
            Self::Arabic => "ar",
            Self::Hindi => "hi",
            Self::Portuguese => "pt",
            Self::Hungarian => "hu",
        }
    }

    /// Snowball stemmer for METEOR stem matching, if one exists for the language
    pub fn stemmer_algorithm(self) -> Option<Algorithm> {
        match self {
            Self::Spanish => Some(Algorithm::Spanish),
            Self::French => Some(Algorithm::French),
            Self::German => Some(Algorithm::German),
            Self::Arabic => Some(Algorithm::Arabic),
            Self::Portuguese => Some(Algorithm::Portuguese),
            Self::Hungarian => Some(Algorithm::Hungarian),
            Self::Japanese | Self::Hindi => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = CopyglotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.name().eq_ignore_ascii_case(wanted) || lang.code().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| CopyglotError::InvalidLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_name_and_code() {
        assert_eq!("French".parse::<Language>().unwrap(), Language::French);
        assert_eq!("hungarian".parse::<Language>().unwrap(), Language::Hungarian);
        assert_eq!("JA".parse::<Language>().unwrap(), Language::Japanese);
        assert_eq!(" pt ".parse::<Language>().unwrap(), Language::Portuguese);
    }

    #[test]
    fn test_unsupported_language_is_rejected() {
        let err = "Klingon".parse::<Language>().unwrap_err();
        assert!(matches!(err, CopyglotError::InvalidLanguage(ref s) if s == "Klingon"));
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Language::ALL.len());
    }
}
