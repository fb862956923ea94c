use regex::Regex;
use std::sync::LazyLock;

// placeholder | single CJK character | word run without CJK | lone symbol
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[[^\]]+\]|[\p{Han}\p{Hiragana}\p{Katakana}]|[\w&&[^\p{Han}\p{Hiragana}\p{Katakana}]]+|[^\w\s]",
    )
    .expect("token pattern is valid")
});

/// Split text into scoring tokens. Placeholder tokens are never lowercased.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| {
            let token = m.as_str();
            if lowercase && !token.starts_with('[') {
                token.to_lowercase()
            } else {
                token.to_string()
            }
        })
        .collect()
}
