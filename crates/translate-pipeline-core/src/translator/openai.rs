use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use super::traits::{Translation, Translator, TranslatorInfo};
use crate::chat::{strip_code_fence, ChatClient, ChatError};
use crate::config::{Lang, TranslatorConfig};
use crate::error::{Error, Result};

/// OpenAI-compatible API translator
///
/// Enforces the configured byte ceiling before calling out, the way a managed
/// translation service rejects oversized text.
pub struct OpenAiTranslator {
    chat: ChatClient,
    max_text_bytes: usize,
}

/// Reply shape requested from the model.
#[derive(Debug, Deserialize)]
struct TranslationReply {
    translation: String,
    #[serde(default)]
    source_language: Option<String>,
}

impl OpenAiTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        Ok(Self {
            chat: ChatClient::new(config, None)?,
            max_text_bytes: config.max_text_bytes,
        })
    }

    /// Create translation prompt
    fn create_prompt(text: &str, source: &Lang, target: &Lang) -> String {
        let source_hint = if source.is_auto() {
            String::new()
        } else {
            format!(" from {}", language_name(source))
        };
        format!(
            "Translate the following text{} into {}. \
             Respond only with a JSON object of the form \
             {{\"translation\": \"...\", \"source_language\": \"<ISO 639-1 code of the original>\"}}.\n\n\
             Text: \"{}\"",
            source_hint,
            language_name(target),
            text
        )
    }

    /// Interpret the model's reply. Anything that is not the requested JSON is
    /// taken as the bare translation.
    fn parse_reply(content: &str, source: &Lang) -> Translation {
        match serde_json::from_str::<TranslationReply>(strip_code_fence(content)) {
            Ok(reply) => Translation {
                text: reply.translation,
                source_lang: reply
                    .source_language
                    .filter(|code| !code.trim().is_empty())
                    .map_or_else(|| source.clone(), |code| Lang::new(code.trim())),
            },
            Err(_) => {
                debug!("Reply is not JSON, using it verbatim");
                Translation {
                    text: content
                        .trim_start_matches('"')
                        .trim_end_matches('"')
                        .to_string(),
                    source_lang: source.clone(),
                }
            }
        }
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "OpenAI Compatible",
        }
    }

    async fn translate(&self, text: &str, source: &Lang, target: &Lang) -> Result<Translation> {
        if text.len() > self.max_text_bytes {
            return Err(Error::TextSizeLimitExceeded {
                max_bytes: self.max_text_bytes,
            });
        }

        // Nothing to do if source and target are the same
        if source.as_str() == target.as_str() && !source.is_auto() {
            return Ok(Translation {
                text: text.to_string(),
                source_lang: source.clone(),
            });
        }

        let prompt = Self::create_prompt(text, source, target);
        match self.chat.complete(&prompt).await {
            Ok(content) => Ok(Self::parse_reply(&content, source)),
            Err(ChatError::PayloadTooLarge) => Err(Error::TextSizeLimitExceeded {
                max_bytes: self.max_text_bytes,
            }),
            Err(ChatError::Timeout) => Err(Error::TranslationTimeout),
            Err(ChatError::InvalidResponse(msg)) => Err(Error::TranslationInvalidResponse(msg)),
            Err(ChatError::Request(msg)) => {
                error!("Translation request failed: {}", msg);
                Err(Error::TranslationRequest(msg))
            }
        }
    }
}

/// Convert language code to human-readable name for prompts
fn language_name(lang: &Lang) -> &'static str {
    match lang.as_str() {
        "en" => "English",
        "zh" | "zh-CN" => "Simplified Chinese",
        "zh-TW" => "Traditional Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "sw" => "Swahili",
        "ar" => "Arabic",
        "hi" => "Hindi",
        // For unknown languages, the LLM should still understand most ISO codes
        _ => "the specified language",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator(max_text_bytes: usize) -> OpenAiTranslator {
        let config = TranslatorConfig {
            max_text_bytes,
            ..TranslatorConfig::default()
        };
        OpenAiTranslator::new(&config).unwrap()
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name(&Lang::new("en")), "English");
        assert_eq!(language_name(&Lang::new("sw")), "Swahili");
        assert_eq!(language_name(&Lang::new("unknown")), "the specified language");
    }

    #[test]
    fn test_prompt_omits_source_for_auto() {
        let prompt = OpenAiTranslator::create_prompt("hola", &Lang::auto(), &Lang::new("en"));
        assert!(prompt.contains("Translate the following text into English"));
        let prompt = OpenAiTranslator::create_prompt("hola", &Lang::new("es"), &Lang::new("en"));
        assert!(prompt.contains("from Spanish"));
    }

    #[test]
    fn test_parse_json_reply() {
        let t = OpenAiTranslator::parse_reply(
            "```json\n{\"translation\": \"Hello\", \"source_language\": \"fr\"}\n```",
            &Lang::auto(),
        );
        assert_eq!(t.text, "Hello");
        assert_eq!(t.source_lang.as_str(), "fr");
    }

    #[test]
    fn test_parse_plain_reply_keeps_requested_source() {
        let t = OpenAiTranslator::parse_reply("\"Hello\"", &Lang::new("fr"));
        assert_eq!(t.text, "Hello");
        assert_eq!(t.source_lang.as_str(), "fr");
    }

    #[tokio::test]
    async fn test_oversized_text_is_rejected_before_request() {
        let t = translator(5);
        let err = t
            .translate("more than five", &Lang::auto(), &Lang::new("es"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TextSizeLimitExceeded { max_bytes: 5 }));
    }

    #[tokio::test]
    async fn test_same_language_short_circuits() {
        let t = translator(5000);
        let out = t
            .translate("hola", &Lang::new("es"), &Lang::new("es"))
            .await
            .unwrap();
        assert_eq!(out.text, "hola");
    }
}
