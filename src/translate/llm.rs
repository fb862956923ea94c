use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{CopyglotError, Result};
use crate::language::Language;
use super::{Attempt, Engine, TranslationBackend, common};

const PROVIDER: &str = "LLM";

const SYSTEM_PROMPT: &str = "You are a professional translator of website copy. Follow these rules strictly:\n\
     1. Translate ONLY the provided text, without adding explanations or notes\n\
     2. Copy every ❮❮PHX❯❯ marker exactly as it appears, keeping it beside the words it belongs to\n\
     3. Return ONLY the translated text\n\
     4. Do not describe what you are doing\n\
     5. Do not include metadata or instructions in the output";

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessageContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageContent {
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat-completions translator (OpenAI-compatible API)
pub struct LlmBackend {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmBackend {
    pub fn new(config: LlmConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(CopyglotError::Configuration("LLM API key cannot be empty".to_string()));
        }

        Ok(Self {
            client: common::build_client(config.timeout_secs)?,
            config,
            api_key,
        })
    }

    /// Build the chat request for one attempt
    pub fn build_request(&self, masked: &str, language: Language, attempt: Attempt) -> ChatRequest {
        let (user_prompt, temperature) = match attempt {
            Attempt::Initial => (
                format!(
                    "Translate this text to {}, keeping all ❮❮PHX❯❯ markers unchanged: {}",
                    language.name(),
                    masked
                ),
                self.config.temperature,
            ),
            Attempt::Strict => (
                format!(
                    "Translate this text to {}. The markers ❮❮PHX❯❯ MUST appear exactly as shown, \
                     once each, in the output: {}\n\nReturn ONLY the translation.",
                    language.name(),
                    masked
                ),
                self.config.retry_temperature,
            ),
        };

        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            temperature,
        }
    }
}

/// Pull the first non-empty completion out of a chat response
pub fn extract_completion(response: ChatResponse) -> Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| common::clean_translation(&content))
        .unwrap_or_default();

    if content.is_empty() {
        return Err(CopyglotError::TranslationFailed(
            "Empty translation received from LLM".to_string(),
        ));
    }
    Ok(content)
}

#[async_trait]
impl TranslationBackend for LlmBackend {
    fn engine(&self) -> Engine {
        Engine::Llm
    }

    async fn translate_masked(&self, masked: &str, language: Language, attempt: Attempt) -> Result<String> {
        let request = self.build_request(masked, language, attempt);
        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));

        debug!("Sending {:?} translation request to: {}", attempt, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| common::request_failed(PROVIDER, e))?;
        let response = common::ensure_success(PROVIDER, response).await?;

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| CopyglotError::TranslationFailed(format!("Failed to parse LLM response: {}", e)))?;

        let completion = extract_completion(chat)?;
        debug!("Raw LLM completion: {}", completion);
        Ok(completion)
    }

    fn supports_strict_retry(&self) -> bool {
        self.config.strict_retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn backend() -> LlmBackend {
        LlmBackend::new(Config::default().llm, "sk-test".to_string()).unwrap()
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let err = LlmBackend::new(Config::default().llm, " ".to_string()).err().unwrap();
        assert!(matches!(err, CopyglotError::Configuration(_)));
    }

    #[test]
    fn test_initial_request_names_language_and_markers() {
        let request = backend().build_request("Hi ❮❮PH0❯❯", Language::Japanese, Attempt::Initial);

        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[1].content.contains("to Japanese"));
        assert!(request.messages[1].content.ends_with("Hi ❮❮PH0❯❯"));
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_strict_request_lowers_temperature() {
        let request = backend().build_request("Hi ❮❮PH0❯❯", Language::Hindi, Attempt::Strict);

        assert!(request.messages[1].content.contains("MUST appear exactly"));
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extract_completion() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Bonjour ❮❮PH0❯❯\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_completion(response).unwrap(), "Bonjour ❮❮PH0❯❯");
    }

    #[test]
    fn test_empty_completion_is_a_translation_failure() {
        let no_choices: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_completion(no_choices),
            Err(CopyglotError::TranslationFailed(_))
        ));

        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_completion(null_content).is_err());
    }
}
