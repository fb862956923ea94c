// Placeholder-safe translation over interchangeable backends
//
// - llm: OpenAI-compatible chat completions
// - baseline: hosted machine translation, used as the comparison arm
//
// Backends only ever see masked text; `PlaceholderSafeTranslator` owns the
// mask / restore / verify cycle so every engine gets the same guarantee.

pub mod baseline;
pub mod common;
pub mod llm;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CopyglotError, Result};
use crate::language::Language;
use crate::placeholder::PlaceholderMap;

/// Which comparison arm produced a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Llm,
    Baseline,
}

impl Engine {
    pub fn label(self) -> &'static str {
        match self {
            Self::Llm => "LLM",
            Self::Baseline => "Baseline",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Engine {
    type Err = CopyglotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "baseline" | "google" => Ok(Self::Baseline),
            _ => Err(CopyglotError::Configuration(format!(
                "Invalid engine '{}'. Valid engines: llm, baseline",
                s
            ))),
        }
    }
}

/// Prompt strength for a backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    /// Follow-up after the first result lost or damaged placeholder markers
    Strict,
}

/// A translation provider that works on marker-masked text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn engine(&self) -> Engine;

    /// Translate English `masked` text into `language`, leaving markers alone
    async fn translate_masked(&self, masked: &str, language: Language, attempt: Attempt) -> Result<String>;

    /// Whether a failed integrity check is worth an `Attempt::Strict` call
    fn supports_strict_retry(&self) -> bool;
}

/// Wraps a backend with placeholder extraction, reinsertion and verification
pub struct PlaceholderSafeTranslator {
    backend: Box<dyn TranslationBackend>,
}

impl PlaceholderSafeTranslator {
    pub fn new(backend: Box<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    pub fn engine(&self) -> Engine {
        self.backend.engine()
    }

    /// Parse `language` first so unsupported targets never reach the backend
    pub async fn translate_str(&self, text: &str, language: &str) -> Result<String> {
        let language = language.parse::<Language>()?;
        self.translate(text, language).await
    }

    pub async fn translate(&self, text: &str, language: Language) -> Result<String> {
        if text.trim().is_empty() {
            return Err(CopyglotError::InvalidInput("text to translate is empty".to_string()));
        }

        let engine = self.engine();
        let (placeholders, masked) = PlaceholderMap::extract_and_mask(text);
        debug!(
            "{} translation to {} with {} placeholder(s)",
            engine,
            language,
            placeholders.len()
        );

        let raw = self
            .backend
            .translate_masked(&masked, language, Attempt::Initial)
            .await?;
        let restored = placeholders.restore(&raw);

        match placeholders.verify(&restored) {
            Ok(()) => Ok(restored),
            Err(e) if self.backend.supports_strict_retry() => {
                warn!("│ {} placeholder check failed ({}), retrying with strict prompt", engine, e);
                let raw = self
                    .backend
                    .translate_masked(&masked, language, Attempt::Strict)
                    .await?;
                let restored = placeholders.restore(&raw);
                placeholders.verify(&restored)?;
                Ok(restored)
            }
            Err(e) => Err(e),
        }
    }
}

/// LLM translator plus baseline comparison arm
pub struct TranslationService {
    llm: PlaceholderSafeTranslator,
    baseline: PlaceholderSafeTranslator,
}

impl TranslationService {
    /// Build both arms from configuration; a missing LLM credential fails here,
    /// before any translation is attempted
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.llm.api_key()?;
        let llm = llm::LlmBackend::new(config.llm.clone(), api_key)?;
        let baseline = baseline::BaselineBackend::new(config.baseline.clone())?;
        info!(
            "Translation service ready (model: {}, baseline: {})",
            config.llm.model, config.baseline.endpoint
        );
        Ok(Self::with_backends(Box::new(llm), Box::new(baseline)))
    }

    pub fn with_backends(llm: Box<dyn TranslationBackend>, baseline: Box<dyn TranslationBackend>) -> Self {
        Self {
            llm: PlaceholderSafeTranslator::new(llm),
            baseline: PlaceholderSafeTranslator::new(baseline),
        }
    }

    pub fn translator(&self, engine: Engine) -> &PlaceholderSafeTranslator {
        match engine {
            Engine::Llm => &self.llm,
            Engine::Baseline => &self.baseline,
        }
    }

    pub async fn translate(&self, text: &str, language: Language) -> Result<String> {
        self.llm.translate(text, language).await
    }

    pub async fn translate_baseline(&self, text: &str, language: Language) -> Result<String> {
        self.baseline.translate(text, language).await
    }

    pub fn supported_languages() -> &'static [Language] {
        &Language::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_backend(engine: Engine, calls: usize) -> MockTranslationBackend {
        let mut mock = MockTranslationBackend::new();
        mock.expect_engine().return_const(engine);
        mock.expect_supports_strict_retry()
            .return_const(engine == Engine::Llm);
        mock.expect_translate_masked()
            .times(calls)
            .returning(|masked, _, _| Ok(format!("«{}»", masked)));
        mock
    }

    #[tokio::test]
    async fn test_unsupported_language_never_reaches_backend() {
        let translator = PlaceholderSafeTranslator::new(Box::new(echo_backend(Engine::Llm, 0)));

        let err = translator.translate_str("Hello [name]", "Klingon").await.unwrap_err();
        assert!(matches!(err, CopyglotError::InvalidLanguage(_)));
    }

    #[tokio::test]
    async fn test_empty_text_never_reaches_backend() {
        let translator = PlaceholderSafeTranslator::new(Box::new(echo_backend(Engine::Llm, 0)));

        let err = translator.translate("   ", Language::French).await.unwrap_err();
        assert!(matches!(err, CopyglotError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_backend_sees_only_masked_text() {
        let mut mock = MockTranslationBackend::new();
        mock.expect_engine().return_const(Engine::Llm);
        mock.expect_supports_strict_retry().return_const(true);
        mock.expect_translate_masked()
            .times(1)
            .returning(|masked, language, attempt| {
                assert_eq!(masked, "Welcome, ❮❮PH0❯❯! Your balance is ❮❮PH1❯❯.");
                assert_eq!(language, Language::French);
                assert_eq!(attempt, Attempt::Initial);
                Ok("Bienvenue, ❮❮PH0❯❯ ! Votre solde est de ❮❮PH1❯❯.".to_string())
            });

        let translator = PlaceholderSafeTranslator::new(Box::new(mock));
        let result = translator
            .translate("Welcome, [userName]! Your balance is [balance].", Language::French)
            .await
            .unwrap();
        assert_eq!(result, "Bienvenue, [userName] ! Votre solde est de [balance].");
    }

    #[tokio::test]
    async fn test_angle_glyph_copy_passes_verification() {
        let mut mock = MockTranslationBackend::new();
        mock.expect_engine().return_const(Engine::Llm);
        mock.expect_supports_strict_retry().return_const(true);
        mock.expect_translate_masked()
            .times(2)
            .returning(|masked, _, _| Ok(masked.to_string()));

        let translator = PlaceholderSafeTranslator::new(Box::new(mock));
        let carousel = translator
            .translate("❮ Back to [brokerName] | Next ❯", Language::French)
            .await
            .unwrap();
        assert_eq!(carousel, "❮ Back to [brokerName] | Next ❯");

        let plan = translator.translate("Choose ❮Premium❯ plan", Language::French).await.unwrap();
        assert_eq!(plan, "Choose ❮Premium❯ plan");
    }

    #[tokio::test]
    async fn test_strict_retry_recovers_lost_placeholder() {
        let mut mock = MockTranslationBackend::new();
        mock.expect_engine().return_const(Engine::Llm);
        mock.expect_supports_strict_retry().return_const(true);
        mock.expect_translate_masked()
            .times(2)
            .returning(|masked, _, attempt| match attempt {
                Attempt::Initial => Ok("Hola".to_string()),
                Attempt::Strict => Ok(masked.replace("Hello", "Hola")),
            });

        let translator = PlaceholderSafeTranslator::new(Box::new(mock));
        let result = translator.translate("Hello [name]", Language::Spanish).await.unwrap();
        assert_eq!(result, "Hola [name]");
    }

    #[tokio::test]
    async fn test_integrity_error_without_strict_retry() {
        let mut mock = MockTranslationBackend::new();
        mock.expect_engine().return_const(Engine::Baseline);
        mock.expect_supports_strict_retry().return_const(false);
        mock.expect_translate_masked()
            .times(1)
            .returning(|_, _, _| Ok("Hallo".to_string()));

        let translator = PlaceholderSafeTranslator::new(Box::new(mock));
        let err = translator.translate("Hello [name]", Language::German).await.unwrap_err();
        assert!(matches!(
            err,
            CopyglotError::PlaceholderIntegrity { ref expected, ref found }
                if expected == &vec!["[name]".to_string()] && found.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_unchanged() {
        let mut mock = MockTranslationBackend::new();
        mock.expect_engine().return_const(Engine::Llm);
        mock.expect_supports_strict_retry().return_const(true);
        mock.expect_translate_masked()
            .times(1)
            .returning(|_, _, _| Err(CopyglotError::TranslationFailed("timed out".to_string())));

        let translator = PlaceholderSafeTranslator::new(Box::new(mock));
        let err = translator.translate("Hello", Language::Hindi).await.unwrap_err();
        assert!(matches!(err, CopyglotError::TranslationFailed(_)));
    }

    #[tokio::test]
    async fn test_service_routes_each_arm() {
        let service = TranslationService::with_backends(
            Box::new(echo_backend(Engine::Llm, 1)),
            Box::new(echo_backend(Engine::Baseline, 1)),
        );

        assert_eq!(service.translator(Engine::Baseline).engine(), Engine::Baseline);
        let llm = service.translate("Open [brokerName]", Language::Arabic).await.unwrap();
        let baseline = service.translate_baseline("Open [brokerName]", Language::Arabic).await.unwrap();
        assert_eq!(llm, "«Open [brokerName]»");
        assert_eq!(baseline, llm);
    }

    #[test]
    fn test_engine_parsing() {
        assert_eq!("LLM".parse::<Engine>().unwrap(), Engine::Llm);
        assert_eq!("google".parse::<Engine>().unwrap(), Engine::Baseline);
        assert!("deepl".parse::<Engine>().is_err());
    }
}
