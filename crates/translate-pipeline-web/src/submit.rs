//! The front-end's translate action: archive the input, translate, persist.

use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use translate_pipeline_core::keys::{text_input_key, timestamped_result_key, upload_key};
use translate_pipeline_core::{
    Error, Lang, ObjectStore, PutOptions, Result, StorageConfig, TranslationResult, Translator,
};

/// A file attached to a submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Bytes,
}

/// Everything the input form sends.
#[derive(Debug, Clone)]
pub struct Submission {
    pub text: String,
    pub file: Option<UploadedFile>,
    pub target_lang: Lang,
}

/// Text and target derived from an uploaded file.
struct FileInput {
    text: String,
    target_lang: Lang,
    is_json: bool,
}

/// Interpret uploaded content. A JSON object with a string `text` supplies the
/// text (and optionally `target_lang`); anything else is translated verbatim.
fn interpret_file(content: &str, selected: &Lang) -> FileInput {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return FileInput {
            text: content.to_string(),
            target_lang: selected.clone(),
            is_json: false,
        };
    };

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    FileInput {
        text: field("text").unwrap_or_else(|| content.to_string()),
        target_lang: field("target_lang").map_or_else(|| selected.clone(), Lang::new),
        is_json: true,
    }
}

pub struct Submitter {
    store: Arc<dyn ObjectStore>,
    translator: Arc<dyn Translator>,
    input_location: String,
    output_location: String,
}

impl Submitter {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        translator: Arc<dyn Translator>,
        storage: &StorageConfig,
    ) -> Self {
        Self {
            store,
            translator,
            input_location: storage.input_location.clone(),
            output_location: storage.output_location.clone(),
        }
    }

    /// Run one submission to completion.
    ///
    /// An empty submission fails with [`Error::NothingToTranslate`] before any
    /// storage write or service call. Otherwise the input is archived first,
    /// whether or not translation then succeeds.
    pub async fn submit(&self, submission: Submission) -> Result<TranslationResult> {
        let Submission {
            text,
            file,
            target_lang,
        } = submission;

        let (text, target_lang) = match file {
            Some(file) => self.archive_file(file, &target_lang).await?,
            None if !text.trim().is_empty() => {
                self.archive_text(&text, &target_lang).await?;
                (text, target_lang)
            }
            None => return Err(Error::NothingToTranslate),
        };

        if text.trim().is_empty() {
            return Err(Error::NothingToTranslate);
        }

        let translation = self
            .translator
            .translate(&text, &Lang::auto(), &target_lang)
            .await
            .map_err(|e| match e {
                Error::TextSizeLimitExceeded { max_bytes } => Error::TextTooLong { max_bytes },
                other => other,
            })?;

        let result = TranslationResult::new(text, translation.text, translation.source_lang, target_lang);

        let key = timestamped_result_key(result.timestamp);
        self.store
            .put(
                &self.output_location,
                &key,
                Bytes::from(result.to_json_bytes()?),
                PutOptions::json(),
            )
            .await?;

        info!(
            "Saved translation ({} -> {}) to {}/{}",
            result.source_lang, result.target_lang, self.output_location, key
        );
        Ok(result)
    }

    async fn archive_file(&self, file: UploadedFile, selected: &Lang) -> Result<(String, Lang)> {
        let content = std::str::from_utf8(&file.data).map_err(|e| {
            error!("File error: {}", e);
            Error::MalformedPayload(format!("File processing error: {} is not UTF-8 text", file.name))
        })?;
        let input = interpret_file(content, selected);

        let (ext, options) = if input.is_json {
            ("json", PutOptions::json())
        } else {
            ("txt", PutOptions::text())
        };
        let key = upload_key(Utc::now(), ext);
        self.store
            .put(&self.input_location, &key, file.data.clone(), options)
            .await?;
        info!("Archived upload {} as {}/{}", file.name, self.input_location, key);

        Ok((input.text, input.target_lang))
    }

    async fn archive_text(&self, text: &str, target_lang: &Lang) -> Result<()> {
        let body = json!({
            "text": text,
            "target_lang": target_lang,
            "source": "text-area",
        });
        let key = text_input_key(Utc::now());
        self.store
            .put(
                &self.input_location,
                &key,
                Bytes::from(serde_json::to_vec(&body)?),
                PutOptions::json(),
            )
            .await?;
        info!("Archived text input as {}/{}", self.input_location, key);
        Ok(())
    }
}
