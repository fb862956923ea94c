use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CopyglotError, Result};
use crate::language::Language;

// Default values for fields added after the first config layout
fn default_strict_retry() -> bool {
    true
}

fn default_retry_temperature() -> f32 {
    0.2
}

fn default_lowercase() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub baseline: BaselineConfig,
    pub evaluation: EvaluationConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub endpoint: String,
    /// Chat model used for translation
    pub model: String,
    /// Sampling temperature for the first attempt
    pub temperature: f32,
    /// Sampling temperature for the stricter placeholder retry
    #[serde(default = "default_retry_temperature")]
    pub retry_temperature: f32,
    /// Retry once with a stricter prompt when placeholders come back damaged
    #[serde(default = "default_strict_retry")]
    pub strict_retry: bool,
    /// Attempts per call on provider or network failure during batch runs
    pub max_retries: u32,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Hosted translate endpoint (gtx client, no credential)
    pub endpoint: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Lowercase tokens before scoring (placeholder tokens are kept verbatim)
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    /// Highest n-gram order for BLEU
    pub bleu_max_order: usize,
    /// METEOR precision/recall weight
    pub meteor_alpha: f64,
    /// METEOR fragmentation penalty exponent
    pub meteor_beta: f64,
    /// METEOR fragmentation penalty weight
    pub meteor_gamma: f64,
    /// Groups of interchangeable words for METEOR synonym matching
    #[serde(default)]
    pub synonym_groups: Vec<Vec<String>>,
    /// Language used when a batch run does not name one
    pub default_language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset used when `evaluate` is run without `--dataset`
    pub path: String,
    /// Column containing the English source text
    pub source_column: String,
    /// Column containing the human reference translation
    pub reference_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                model: "gpt-4".to_string(),
                temperature: 0.3,
                retry_temperature: 0.2,
                strict_retry: true,
                max_retries: 3,
                timeout_secs: 60,
                api_key_env: "OPENAI_API_KEY".to_string(),
            },
            baseline: BaselineConfig {
                endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
                timeout_secs: 30,
            },
            evaluation: EvaluationConfig {
                lowercase: true,
                bleu_max_order: 4,
                meteor_alpha: 0.9,
                meteor_beta: 3.0,
                meteor_gamma: 0.5,
                synonym_groups: Vec::new(),
                default_language: Language::Hungarian,
            },
            dataset: DatasetConfig {
                path: "translated_output.csv".to_string(),
                source_column: "original_text".to_string(),
                reference_column: "reference_text".to_string(),
            },
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Config::default().evaluation
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CopyglotError::Configuration(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| CopyglotError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CopyglotError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CopyglotError::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    /// Resolve the API key through an arbitrary lookup; blank values count as missing
    pub fn api_key_from<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&self.api_key_env) {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(CopyglotError::Configuration(format!(
                "{} environment variable not set; the LLM translator needs an API key",
                self.api_key_env
            ))),
        }
    }
}
