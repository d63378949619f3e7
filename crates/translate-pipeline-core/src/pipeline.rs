//! Event-driven translation pipeline.
//!
//! One invocation handles one storage notification: read the new object,
//! resolve the source language, translate, emit metrics, write the result.
//! Nothing is retried; a failed service call fails the invocation.

use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{Lang, StorageConfig};
use crate::detector::LanguageDetector;
use crate::error::{Error, Result};
use crate::event::{first_object, ObjectRef, PipelineResponse};
use crate::keys::result_key_for;
use crate::metrics::{language_pair_metric, MetricUnit, Metrics, CHARACTERS_TRANSLATED};
use crate::model::{TranslationRequest, TranslationResult};
use crate::storage::{ObjectStore, PutOptions};
use crate::translator::Translator;

/// Clients the pipeline talks to, constructed once per process.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn ObjectStore>,
    pub translator: Arc<dyn Translator>,
    pub detector: Arc<dyn LanguageDetector>,
    pub metrics: Metrics,
}

/// What a successful invocation produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub result: TranslationResult,
    pub written: ObjectRef,
}

pub struct TranslationPipeline {
    services: Services,
    input_location: String,
    output_location: String,
}

impl TranslationPipeline {
    pub fn new(services: Services, storage: &StorageConfig) -> Self {
        Self {
            services,
            input_location: storage.input_location.clone(),
            output_location: storage.output_location.clone(),
        }
    }

    pub fn input_location(&self) -> &str {
        &self.input_location
    }

    /// Run one invocation. Never fails: errors become a 500 response.
    pub async fn handle(&self, event: &Value) -> PipelineResponse {
        match self.process(event).await {
            Ok(output) => PipelineResponse::success(
                self.services
                    .store
                    .uri(&output.written.location, &output.written.key),
            ),
            Err(e) => {
                error!(kind = ?e.kind(), "Error: {}", error_chain(&e));
                PipelineResponse::failure(&e)
            }
        }
    }

    /// The fallible invocation sequence.
    pub async fn process(&self, event: &Value) -> Result<PipelineOutput> {
        let object = first_object(event)?;

        if object.location != self.input_location {
            return Err(Error::UnexpectedLocation {
                actual: object.location,
                expected: self.input_location.clone(),
            });
        }
        let output_key = result_key_for(&object.key)?;

        let request = self.read_request(&object).await?;

        let source = match &request.source_lang {
            Some(lang) => lang.clone(),
            None => self.detect_source(&request.text).await,
        };

        let translation = self
            .services
            .translator
            .translate(&request.text, &source, &request.target_lang)
            .await
            .map_err(|e| match e {
                Error::TextSizeLimitExceeded { max_bytes } => {
                    error!("Text exceeds {} bytes limit for translation", max_bytes);
                    Error::TextTooLong { max_bytes }
                }
                other => {
                    error!("Translation service error: {}", other);
                    other
                }
            })?;

        let result = TranslationResult::new(
            request.text,
            translation.text,
            source,
            request.target_lang,
        );

        self.publish_metrics(&result).await;

        let body = Bytes::from(result.to_json_bytes()?);
        self.services
            .store
            .put(&self.output_location, &output_key, body, PutOptions::json())
            .await
            .inspect_err(|e| error!("Storage write error: {}", e))?;

        info!(
            "Translated {} ({} -> {}) to {}/{}",
            object.key, result.source_lang, result.target_lang, self.output_location, output_key
        );

        Ok(PipelineOutput {
            result,
            written: ObjectRef {
                location: self.output_location.clone(),
                key: output_key,
            },
        })
    }

    async fn read_request(&self, object: &ObjectRef) -> Result<TranslationRequest> {
        let data = self
            .services
            .store
            .get(&object.location, &object.key)
            .await
            .inspect_err(|e| error!("Error getting object from storage: {}", e))?;

        TranslationRequest::from_json(&data)
            .inspect_err(|e| error!("Invalid request in {}: {}", object.key, e))
    }

    /// Best-effort detection: top-ranked code, or `"auto"` on any failure.
    async fn detect_source(&self, text: &str) -> Lang {
        match self.services.detector.detect(text).await {
            Ok(ranked) => {
                if let Some(best) = ranked.into_iter().next() {
                    info!("Detected language: {} ({:.2})", best.code, best.score);
                    best.code
                } else {
                    warn!("Detection returned no candidates, falling back to auto");
                    Lang::auto()
                }
            }
            Err(e) => {
                error!("Language detection error: {}", e);
                Lang::auto()
            }
        }
    }

    async fn publish_metrics(&self, result: &TranslationResult) {
        #[allow(clippy::cast_precision_loss)]
        let chars = result.char_count() as f64;
        let metrics = &self.services.metrics;
        metrics
            .publish(CHARACTERS_TRANSLATED, chars, MetricUnit::Count)
            .await;
        metrics
            .publish(
                &language_pair_metric(&result.source_lang, &result.target_lang),
                1.0,
                MetricUnit::Count,
            )
            .await;
    }
}

/// `err: source: source...` for log lines.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
