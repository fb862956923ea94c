//! Placeholder tokens such as `[brokerName]` that must survive translation verbatim.
//!
//! Before a text goes to a translator every token is swapped for an opaque
//! marker `❮❮PH{i}❯❯`, numbered by position. Afterwards the markers are
//! swapped back, including the damaged forms translators tend to return,
//! and the result is checked against the source token sequence.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::error::{CopyglotError, Result};

/// Opening bracket, one or more non-`]` characters, closing bracket.
pub static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]").expect("placeholder pattern is valid"));

static MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"❮❮PH(\d+)❯❯").expect("marker pattern is valid"));

/// Damaged marker shapes, tried in order after the exact pass.
static DAMAGED_MARKER_PATTERNS: LazyLock<Vec<(Regex, bool)>> = LazyLock::new(|| {
    [
        // whitespace or a lost bracket inside the marker
        (r"❮{1,2}\s*(?i:ph)\s*(\d+)\s*❯{1,2}", false),
        (r"(?i)_{0,2}placeholder_(\d+)_{0,2}", false),
        // bare `PH0`, or `ph0❯❯` with the opening half dropped
        (r"(?i)ph(\d+)❯{0,2}", true),
    ]
    .into_iter()
    .map(|(pattern, standalone)| (Regex::new(pattern).expect("marker pattern is valid"), standalone))
    .collect()
});

/// Tokens plus leftover marker-shaped debris, used when checking the output.
/// Plain `❮`/`❯` glyphs in copy are not debris.
static OUTPUT_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]+\]|❮+\s*(?i:ph)\s*\d+\s*❯*|(?i:ph)\s*\d+\s*❯+|(?i:__placeholder_\d+__)")
        .expect("output token pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub token: String,
    /// Byte offset in the source text
    pub position: usize,
}

/// Ordered placeholder tokens of one source text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    placeholders: Vec<Placeholder>,
}

impl PlaceholderMap {
    pub fn extract(source: &str) -> Self {
        Self::extract_and_mask(source).0
    }

    /// Extract tokens and return the source with each one replaced by its marker.
    /// Repeated tokens get distinct markers.
    pub fn extract_and_mask(source: &str) -> (Self, String) {
        let mut placeholders = Vec::new();
        let mut masked = String::with_capacity(source.len());
        let mut last = 0;

        for found in PLACEHOLDER_PATTERN.find_iter(source) {
            masked.push_str(&source[last..found.start()]);
            masked.push_str(&Self::marker(placeholders.len()));
            placeholders.push(Placeholder {
                token: found.as_str().to_string(),
                position: found.start(),
            });
            last = found.end();
        }
        masked.push_str(&source[last..]);

        (Self { placeholders }, masked)
    }

    pub fn marker(index: usize) -> String {
        format!("❮❮PH{}❯❯", index)
    }

    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders.iter()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.placeholders.iter().map(|p| p.token.as_str()).collect()
    }

    /// Put the original tokens back in place of their markers.
    pub fn restore(&self, translated: &str) -> String {
        if self.is_empty() {
            return translated.to_string();
        }

        let tokens = self.tokens();
        let (mut restored, exact_hits) = replace_indexed(translated, &MARKER_PATTERN, &tokens, false);
        if exact_hits == tokens.len() {
            return restored;
        }

        for (pattern, standalone) in DAMAGED_MARKER_PATTERNS.iter() {
            restored = replace_indexed(&restored, pattern, &tokens, *standalone).0;
        }
        restored
    }

    /// Check that `output` carries exactly the source tokens in source order,
    /// with no marker debris left behind.
    pub fn verify(&self, output: &str) -> Result<()> {
        let found: Vec<String> = OUTPUT_TOKEN_PATTERN
            .find_iter(output)
            .map(|m| m.as_str().to_string())
            .collect();

        if found.iter().map(String::as_str).eq(self.tokens()) {
            return Ok(());
        }

        Err(CopyglotError::PlaceholderIntegrity {
            expected: self.placeholders.iter().map(|p| p.token.clone()).collect(),
            found,
        })
    }
}

/// Replace every `pattern` match whose first group indexes into `tokens`.
/// Matches inside existing bracket tokens are left alone; `standalone`
/// additionally skips matches glued to a preceding ASCII letter or digit.
fn replace_indexed(text: &str, pattern: &Regex, tokens: &[&str], standalone: bool) -> (String, usize) {
    let protected: Vec<Range<usize>> = PLACEHOLDER_PATTERN.find_iter(text).map(|m| m.range()).collect();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut hits = 0;

    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let token = caps
            .get(1)
            .and_then(|index| index.as_str().parse::<usize>().ok())
            .and_then(|index| tokens.get(index));
        let Some(token) = token else { continue };

        if protected.iter().any(|r| r.start < whole.end() && whole.start() < r.end) {
            continue;
        }
        if standalone
            && text[..whole.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric())
        {
            continue;
        }

        out.push_str(&text[last..whole.start()]);
        out.push_str(token);
        last = whole.end();
        hits += 1;
    }
    out.push_str(&text[last..]);

    (out, hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_records_tokens_and_positions() {
        let map = PlaceholderMap::extract("Welcome, [userName]! Your balance is [balance].");
        assert_eq!(map.tokens(), vec!["[userName]", "[balance]"]);
        let positions: Vec<usize> = map.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![9, 37]);
    }

    #[test]
    fn test_tokens_may_contain_spaces() {
        let map = PlaceholderMap::extract("Compare [Broker name] with [param description]");
        assert_eq!(map.tokens(), vec!["[Broker name]", "[param description]"]);
    }

    #[test]
    fn test_empty_brackets_are_not_placeholders() {
        assert!(PlaceholderMap::extract("Nothing [] here").is_empty());
    }

    #[test]
    fn test_mask_gives_repeated_tokens_distinct_markers() {
        let (map, masked) = PlaceholderMap::extract_and_mask("[year] vs [year]: [brokerName]");
        assert_eq!(map.len(), 3);
        assert_eq!(masked, "❮❮PH0❯❯ vs ❮❮PH1❯❯: ❮❮PH2❯❯");
        assert_eq!(map.restore(&masked), "[year] vs [year]: [brokerName]");
    }

    #[test]
    fn test_restore_follows_marker_order_in_translation() {
        let (map, _) = PlaceholderMap::extract_and_mask("[first] sent to [second]");
        let restored = map.restore("❮❮PH1❯❯ は ❮❮PH0❯❯ によって送信された");
        assert_eq!(restored, "[second] は [first] によって送信された");
    }

    #[test]
    fn test_restore_handles_damaged_markers() {
        let (map, _) = PlaceholderMap::extract_and_mask("[a] [b] [c] [d]");
        let restored = map.restore("❮❮ PH 0 ❯❯ __PLACEHOLDER_1__ Ph2 の ph3❯❯");
        assert_eq!(restored, "[a] [b] [c] の [d]");
    }

    #[test]
    fn test_restore_leaves_words_that_only_look_like_markers() {
        let (map, _) = PlaceholderMap::extract_and_mask("[a] [b]");
        let restored = map.restore("graph1 ❮❮PH0❯❯ phase");
        assert_eq!(restored, "graph1 [a] phase");
    }

    #[test]
    fn test_restore_ignores_out_of_range_markers() {
        let (map, _) = PlaceholderMap::extract_and_mask("[only]");
        assert_eq!(map.restore("❮❮PH0❯❯ ❮❮PH7❯❯"), "[only] ❮❮PH7❯❯");
    }

    #[test]
    fn test_verify_accepts_exact_sequence() {
        let map = PlaceholderMap::extract("Hello [name], see [link]");
        assert!(map.verify("Bonjour [name], voir [link]").is_ok());
    }

    #[test]
    fn test_verify_rejects_missing_reordered_and_leftover_tokens() {
        let map = PlaceholderMap::extract("Hello [name], see [link]");

        let missing = map.verify("Bonjour, voir [link]").unwrap_err();
        assert!(matches!(
            missing,
            CopyglotError::PlaceholderIntegrity { ref expected, ref found }
                if expected.len() == 2 && found == &vec!["[link]".to_string()]
        ));

        assert!(map.verify("Voir [link], bonjour [name]").is_err());
        assert!(map.verify("Bonjour [name], voir ❮❮PH1❯❯").is_err());
        assert!(map.verify("Bonjour [nom], voir [link]").is_err());
    }

    #[test]
    fn test_angle_glyphs_in_copy_are_not_debris() {
        let (map, masked) = PlaceholderMap::extract_and_mask("❮ Back to [brokerName] | Next ❯");
        assert_eq!(masked, "❮ Back to ❮❮PH0❯❯ | Next ❯");

        let restored = map.restore("❮ Retour à ❮❮PH0❯❯ | Suivant ❯");
        assert_eq!(restored, "❮ Retour à [brokerName] | Suivant ❯");
        assert!(map.verify(&restored).is_ok());

        let plain = PlaceholderMap::extract("Choose ❮Premium❯ plan");
        assert!(plain.verify("Choisissez l'offre ❮Premium❯").is_ok());
    }

    #[test]
    fn test_verify_rejects_half_and_out_of_range_markers() {
        let map = PlaceholderMap::extract("Hello [name]");
        assert!(map.verify("Bonjour [name] ph1❯❯").is_err());
        assert!(map.verify("Bonjour [name] ❮❮ PH 3").is_err());
        assert!(map.verify("Bonjour [name] __PLACEHOLDER_2__").is_err());
    }

    #[test]
    fn test_verify_without_placeholders() {
        let map = PlaceholderMap::extract("Plain copy");
        assert!(map.verify("Texte simple").is_ok());
        assert!(map.verify("Texte [ajouté]").is_err());
    }
}
