use reqwest::{Client, Response};
use std::time::Duration;

use crate::error::{CopyglotError, Result};

/// Build an HTTP client with a per-call timeout
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CopyglotError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport-level failure to `TranslationFailed`, naming the provider
pub fn request_failed(provider: &str, error: reqwest::Error) -> CopyglotError {
    if error.is_timeout() {
        CopyglotError::TranslationFailed(format!("{} request timed out: {}", provider, error))
    } else {
        CopyglotError::TranslationFailed(format!("{} request failed: {}", provider, error))
    }
}

/// Pass successful responses through; turn any other status into `TranslationFailed`
pub async fn ensure_success(provider: &str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(CopyglotError::TranslationFailed(format!(
        "{} API error {}: {}",
        provider,
        status,
        error_text.trim()
    )))
}

/// Strip whitespace and a single pair of wrapping quotes some models add
pub fn clean_translation(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '“', '«', '「'] {
        let closing = match quote {
            '“' => '”',
            '«' => '»',
            '「' => '」',
            other => other,
        };
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(closing))
        {
            if !inner.contains(quote) {
                return inner.trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_translation() {
        assert_eq!(clean_translation("  Bonjour  \n"), "Bonjour");
        assert_eq!(clean_translation("\"Hola, mundo\""), "Hola, mundo");
        assert_eq!(clean_translation("「こんにちは」"), "こんにちは");
        assert_eq!(clean_translation("\"a\" and \"b\""), "\"a\" and \"b\"");
    }
}
