//! Translate Pipeline Core Library
//!
//! This library provides the pieces shared by the pipeline runner and the
//! interactive front-end:
//! - Translation request/result records and storage notification payloads
//! - Service contracts (object storage, translation, language detection, metrics)
//!   with OpenAI-compatible, filesystem, in-memory and tracing backends
//! - The event-driven translation pipeline

mod chat;
pub mod config;
pub mod detector;
pub mod error;
pub mod event;
pub mod keys;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod translator;
pub mod util;

pub use config::{
    AppConfig, Lang, LanguageOption, MetricsConfig, StorageConfig, TranslatorConfig,
    flag_for_lang, is_target_language, target_languages, AUTO_LANG, DEFAULT_TARGET_LANG,
    MAX_TEXT_BYTES,
};
pub use detector::{create_detector, DetectedLanguage, LanguageDetector, OpenAiDetector};
pub use error::{Error, ErrorKind, Result};
pub use event::{PipelineResponse, ResponseBody, StorageNotification};
pub use metrics::{MemoryMetrics, MetricDatum, MetricUnit, Metrics, MetricsSink, TracingMetrics};
pub use model::{TranslationRequest, TranslationResult};
pub use pipeline::{PipelineOutput, Services, TranslationPipeline};
pub use storage::{
    AccessPolicy, FsObjectStore, MemoryObjectStore, ObjectStore, PutOptions, StoredObject,
};
pub use translator::{create_translator, OpenAiTranslator, Translation, Translator, TranslatorInfo};

use std::sync::Arc;

/// Build the production service set from configuration: filesystem store,
/// OpenAI-compatible translator and detector, tracing metrics.
pub fn services_from_config(config: &AppConfig) -> Result<Services> {
    Ok(Services {
        store: Arc::new(FsObjectStore::new(config.storage.root.clone())),
        translator: create_translator(&config.translator)?,
        detector: create_detector(config)?,
        metrics: Metrics::new(Arc::new(TracingMetrics::new()), &config.metrics),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_from_default_config() {
        let services = services_from_config(&AppConfig::default()).unwrap();
        assert_eq!(services.store.scheme(), "file");
        assert_eq!(services.translator.name(), "OpenAI Compatible");
    }
}
