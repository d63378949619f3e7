use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{DetectedLanguage, LanguageDetector};
use crate::chat::{strip_code_fence, ChatClient};
use crate::config::{Lang, TranslatorConfig};
use crate::error::{Error, Result};

/// Characters of input sent for detection; the dominant language is
/// identifiable from a prefix.
const SAMPLE_CHARS: usize = 1000;

/// Language detector backed by an OpenAI-compatible chat endpoint.
pub struct OpenAiDetector {
    chat: ChatClient,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    code: String,
    #[serde(default)]
    confidence: f32,
}

impl OpenAiDetector {
    pub fn new(config: &TranslatorConfig, model: Option<&str>) -> Result<Self> {
        Ok(Self {
            chat: ChatClient::new(config, model)?,
        })
    }

    fn create_prompt(text: &str) -> String {
        let sample: String = text.chars().take(SAMPLE_CHARS).collect();
        format!(
            "Identify the dominant language of the following text. \
             Respond only with a JSON array of up to three objects of the form \
             {{\"code\": \"<ISO 639-1 code>\", \"confidence\": <0.0-1.0>}}, most likely first.\n\n\
             Text: \"{sample}\""
        )
    }

    /// Parse and rank the model's candidates by descending confidence.
    fn parse_reply(content: &str) -> Result<Vec<DetectedLanguage>> {
        let candidates: Vec<Candidate> = serde_json::from_str(strip_code_fence(content))
            .map_err(|e| Error::Detection(format!("unparseable detection reply: {e}")))?;

        let mut ranked: Vec<DetectedLanguage> = candidates
            .into_iter()
            .filter(|c| !c.code.trim().is_empty())
            .map(|c| DetectedLanguage {
                code: Lang::new(c.code.trim().to_lowercase()),
                score: c.confidence.clamp(0.0, 1.0),
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}

#[async_trait]
impl LanguageDetector for OpenAiDetector {
    async fn detect(&self, text: &str) -> Result<Vec<DetectedLanguage>> {
        let content = self
            .chat
            .complete(&Self::create_prompt(text))
            .await
            .map_err(|e| Error::Detection(e.to_string()))?;
        let ranked = Self::parse_reply(&content)?;
        debug!("Detection candidates: {:?}", ranked);
        Ok(ranked)
    }
}
