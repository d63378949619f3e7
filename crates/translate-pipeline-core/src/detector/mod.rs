//! Language detection backends.

mod openai;

pub use openai::OpenAiDetector;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{AppConfig, Lang};
use crate::error::Result;

/// One candidate language with the service's confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLanguage {
    pub code: Lang,
    /// Confidence in `0.0..=1.0`
    pub score: f32,
}

/// Trait for language detection backends
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Candidate languages for `text`, best first.
    async fn detect(&self, text: &str) -> Result<Vec<DetectedLanguage>>;
}

/// Create a detector from configuration
pub fn create_detector(config: &AppConfig) -> Result<Arc<dyn LanguageDetector>> {
    Ok(Arc::new(OpenAiDetector::new(
        &config.translator,
        config.detector.model.as_deref(),
    )?))
}
