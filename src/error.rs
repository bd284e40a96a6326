//! Error handling for the resume screener

use thiserror::Error;

/// Fatal errors. Only these escape a batch run.
#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

/// model2vec reports load failures through anyhow
impl From<anyhow::Error> for ScreenerError {
    fn from(err: anyhow::Error) -> Self {
        ScreenerError::ModelLoading(err.to_string())
    }
}

/// Why a document could not be turned into text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    #[error("document contains no extractable text")]
    EmptyContent,
}

/// Why two texts could not be scored against each other.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("cosine similarity is undefined for a zero-magnitude embedding")]
    DegenerateInput,

    #[error("embedding provider failed: {0}")]
    ProviderFailure(String),
}

/// A failure confined to a single document of a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("worker failed: {0}")]
    Worker(String),
}
