use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyglotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported target language: {0}")]
    InvalidLanguage(String),

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("Placeholder integrity error: expected {expected:?}, found {found:?}")]
    PlaceholderIntegrity {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scoring failure: {0}")]
    ScoringFailure(String),

    #[error("Dataset error: {0}")]
    Dataset(String),
}

impl CopyglotError {
    /// Per-call provider failures are worth another attempt; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TranslationFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, CopyglotError>;
