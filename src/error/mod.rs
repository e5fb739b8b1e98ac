use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dataset error: {0}")]
    Format(#[from] FormatError),

    #[error("Completion backend error: {0}")]
    Transport(#[from] TransportError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while parsing an uploaded delimited dataset.
///
/// Fatal to that upload only; the caller must re-supply a file.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("file is empty")]
    Empty,

    #[error("header row has no columns")]
    NoColumns,
}

/// Completion-backend transport errors, surfaced verbatim to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure to salvage structured data from a model response.
///
/// Truncation at the output-token budget is the dominant cause, so every
/// variant carries the same remediation hint for the user.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(
        "could not recover a JSON {expected} from the response; \
         it was likely truncated - try reducing the max output tokens"
    )]
    Unrecoverable { expected: &'static str },

    #[error(
        "the response contained no hypotheses; \
         it was likely truncated - try reducing the max output tokens"
    )]
    EmptyResult,
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for completion-backend operations
pub type TransportResult<T> = Result<T, TransportError>;
