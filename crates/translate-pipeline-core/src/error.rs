use thiserror::Error;

/// Unified error type for translate-pipeline-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Validation of notification payloads and translation requests
/// - Storage operations (reading inputs, writing results)
/// - Translation and language-detection service calls
/// - Metrics emission
/// - Configuration loading and general I/O
///
/// Every variant belongs to one [`ErrorKind`], which is what callers branch on
/// when deciding whether to recover or abort.
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    /// Notification payload carried no records
    #[error("No storage records found in event")]
    NoRecords,

    /// Notification record is missing its location or key
    #[error("Malformed storage event: {0}")]
    MalformedEvent(String),

    /// Notification came from a location other than the configured input
    #[error("Invalid source location: {actual}. Expected: {expected}")]
    UnexpectedLocation { actual: String, expected: String },

    /// Input object is not a JSON object of the expected shape
    #[error("Malformed request payload: {0}")]
    MalformedPayload(String),

    /// Required request fields are absent
    #[error("Missing required fields: {}. Expected: text, target_lang", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Text exceeds the translation service's byte ceiling (user-facing form)
    #[error("Text too long (max {max_bytes} bytes)")]
    TextTooLong { max_bytes: usize },

    /// Object key cannot be used to derive a storage path
    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Interactive submission with neither text nor file
    #[error("Please enter text or upload a file!")]
    NothingToTranslate,

    // ==========================================================================
    // Storage Errors
    // ==========================================================================
    /// Object does not exist
    #[error("object not found: {location}/{key}")]
    ObjectNotFound { location: String, key: String },

    /// Failed to read an object
    #[error("failed to read {location}/{key}: {reason}")]
    StorageRead {
        location: String,
        key: String,
        reason: String,
    },

    /// Failed to write an object
    #[error("failed to write {location}/{key}: {reason}")]
    StorageWrite {
        location: String,
        key: String,
        reason: String,
    },

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    /// Service rejected the text for exceeding its size limit
    #[error("text size limit exceeded ({max_bytes} bytes)")]
    TextSizeLimitExceeded { max_bytes: usize },

    // ==========================================================================
    // Detection / Metrics Errors
    // ==========================================================================
    /// Language detection failed
    #[error("language detection failed: {0}")]
    Detection(String),

    /// Metric emission failed
    #[error("metric emission failed: {0}")]
    Metrics(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used by the entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; user-facing, never retried
    Validation,
    /// A collaborating service failed
    Dependency,
    /// Anything else
    Unknown,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRecords
            | Self::MalformedEvent(_)
            | Self::UnexpectedLocation { .. }
            | Self::MalformedPayload(_)
            | Self::MissingFields(_)
            | Self::TextTooLong { .. }
            | Self::InvalidKey { .. }
            | Self::NothingToTranslate => ErrorKind::Validation,
            Self::ObjectNotFound { .. }
            | Self::StorageRead { .. }
            | Self::StorageWrite { .. }
            | Self::TranslationRequest(_)
            | Self::TranslationInvalidResponse(_)
            | Self::TranslationTimeout
            | Self::TextSizeLimitExceeded { .. }
            | Self::Detection(_)
            | Self::Metrics(_) => ErrorKind::Dependency,
            Self::ConfigLoad(_) | Self::ConfigInvalid { .. } | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Unknown
            }
        }
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
