//! Baseline machine translation through Google's hosted translate endpoint.
//!
//! Uses the keyless `client=gtx` interface, so the LLM key stays the only
//! required credential. The response is a nested JSON array whose first
//! element lists `[translated, source, ...]` segments; the translation is the
//! concatenation of the segment heads.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::BaselineConfig;
use crate::error::{CopyglotError, Result};
use crate::language::Language;
use super::{Attempt, Engine, TranslationBackend, common};

const PROVIDER: &str = "Baseline";

pub struct BaselineBackend {
    client: Client,
    config: BaselineConfig,
}

impl BaselineBackend {
    pub fn new(config: BaselineConfig) -> Result<Self> {
        Ok(Self {
            client: common::build_client(config.timeout_secs)?,
            config,
        })
    }
}

/// Concatenate the translated segments of a gtx response
pub fn parse_gtx_response(json: &Value) -> Result<String> {
    let segments = json
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            CopyglotError::TranslationFailed("Invalid baseline response: missing segment array".to_string())
        })?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(CopyglotError::TranslationFailed(
            "Empty translation received from baseline".to_string(),
        ));
    }
    Ok(text.trim().to_string())
}

#[async_trait]
impl TranslationBackend for BaselineBackend {
    fn engine(&self) -> Engine {
        Engine::Baseline
    }

    async fn translate_masked(&self, masked: &str, language: Language, _attempt: Attempt) -> Result<String> {
        debug!("Sending baseline translation request to: {}", self.config.endpoint);

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "en"),
                ("tl", language.code()),
                ("dt", "t"),
                ("q", masked),
            ])
            .send()
            .await
            .map_err(|e| common::request_failed(PROVIDER, e))?;
        let response = common::ensure_success(PROVIDER, response).await?;

        let json: Value = response.json().await.map_err(|e| {
            CopyglotError::TranslationFailed(format!("Failed to parse baseline response: {}", e))
        })?;

        parse_gtx_response(&json)
    }

    fn supports_strict_retry(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_joins_segments() {
        let response = json!([
            [
                ["Bienvenue, ❮❮PH0❯❯ ! ", "Welcome, ❮❮PH0❯❯! ", null, null, 10],
                ["Votre solde est ❮❮PH1❯❯.", "Your balance is ❮❮PH1❯❯.", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            parse_gtx_response(&response).unwrap(),
            "Bienvenue, ❮❮PH0❯❯ ! Votre solde est ❮❮PH1❯❯."
        );
    }

    #[test]
    fn test_parse_rejects_unexpected_shapes() {
        assert!(parse_gtx_response(&json!({"error": "quota"})).is_err());
        assert!(parse_gtx_response(&json!([[]])).is_err());
        assert!(parse_gtx_response(&json!([[[null, "Hello"]]])).is_err());
    }
}
