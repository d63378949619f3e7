use async_trait::async_trait;
use crate::config::Lang;
use crate::error::Result;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
}

/// Output of a translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Source language the service actually translated from
    pub source_lang: Lang,
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate text from source language (or `"auto"`) to target language.
    ///
    /// Text over the backend's size ceiling fails with
    /// [`crate::Error::TextSizeLimitExceeded`].
    async fn translate(
        &self,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<Translation>;
}
