//! Translation request and result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Lang;
use crate::error::{Error, Result};

/// A validated translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub target_lang: Lang,
    /// `None` means the source language should be detected
    pub source_lang: Option<Lang>,
}

impl TranslationRequest {
    /// Parse and validate a JSON object payload.
    ///
    /// `text` and `target_lang` must be present, non-null and non-empty;
    /// every missing field is named in the error. An empty `source_lang` is
    /// treated as absent.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| Error::MalformedPayload(format!("input is not UTF-8: {e}")))?;
        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::MalformedPayload(format!("input is not valid JSON: {e}")))?;
        let Value::Object(fields) = value else {
            return Err(Error::MalformedPayload(
                "input must be a JSON object".to_string(),
            ));
        };
        Self::from_fields(&fields)
    }

    fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        // Presence is checked before type
        let missing: Vec<&'static str> = ["text", "target_lang"]
            .into_iter()
            .filter(|name| is_missing(fields, name))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        Ok(Self {
            text: required_string(fields, "text")?,
            target_lang: Lang::new(required_string(fields, "target_lang")?),
            source_lang: string_field(fields, "source_lang")?.map(Lang::new),
        })
    }
}

/// Absent, null and "" all count as missing.
fn is_missing(fields: &Map<String, Value>, name: &str) -> bool {
    match fields.get(name) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn required_string(fields: &Map<String, Value>, name: &'static str) -> Result<String> {
    string_field(fields, name)?.ok_or_else(|| Error::MissingFields(vec![name]))
}

/// Read an optional string field; absent, null and "" are all `None`.
fn string_field(fields: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::MalformedPayload(format!(
            "field '{name}' must be a string, got {other}"
        ))),
    }
}

/// A completed translation, persisted once as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original_text: String,
    pub translated_text: String,
    /// Code actually used: supplied, detected, or `"auto"`
    pub source_lang: Lang,
    pub target_lang: Lang,
    pub timestamp: DateTime<Utc>,
}

impl TranslationResult {
    /// Assemble a result stamped with the current time.
    pub fn new(
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        source_lang: Lang,
        target_lang: Lang,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            source_lang,
            target_lang,
            timestamp: Utc::now(),
        }
    }

    /// Number of characters in the original text.
    pub fn char_count(&self) -> usize {
        self.original_text.chars().count()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_request() {
        let req = TranslationRequest::from_json(
            br#"{"text": "Bonjour", "target_lang": "en", "source_lang": "fr"}"#,
        )
        .unwrap();
        assert_eq!(req.text, "Bonjour");
        assert_eq!(req.target_lang.as_str(), "en");
        assert_eq!(req.source_lang, Some(Lang::new("fr")));
    }

    #[test]
    fn test_empty_source_lang_means_detect() {
        let req = TranslationRequest::from_json(
            br#"{"text": "Hola", "target_lang": "en", "source_lang": ""}"#,
        )
        .unwrap();
        assert!(req.source_lang.is_none());
    }

    #[test]
    fn test_missing_fields_are_enumerated() {
        let err = TranslationRequest::from_json(br#"{"source_lang": "fr"}"#).unwrap_err();
        match err {
            Error::MissingFields(fields) => assert_eq!(fields, vec!["text", "target_lang"]),
            other => panic!("unexpected error: {other}"),
        }

        let err = TranslationRequest::from_json(br#"{"text": "hi", "target_lang": null}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingFields(ref f) if f == &vec!["target_lang"]));
    }

    #[test]
    fn test_missing_field_reported_before_wrong_type() {
        let err = TranslationRequest::from_json(br#"{"text": 3}"#).unwrap_err();
        assert!(matches!(err, Error::MissingFields(ref f) if f == &vec!["target_lang"]), "{err}");

        let err = TranslationRequest::from_json(br#"{"text": "", "target_lang": ["es"]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingFields(ref f) if f == &vec!["text"]), "{err}");
    }

    #[test]
    fn test_malformed_payloads() {
        let payloads: [&[u8]; 3] = [
            b"not json",
            b"[1, 2]",
            br#"{"text": 3, "target_lang": "es"}"#,
        ];
        for payload in payloads {
            let err = TranslationRequest::from_json(payload).unwrap_err();
            assert!(matches!(err, Error::MalformedPayload(_)), "{err}");
        }
    }

    #[test]
    fn test_result_serializes_expected_fields() {
        let result = TranslationResult::new("héllo", "hola", Lang::auto(), Lang::new("es"));
        assert_eq!(result.char_count(), 5);

        let value: Value = serde_json::from_slice(&result.to_json_bytes().unwrap()).unwrap();
        assert_eq!(value["original_text"], "héllo");
        assert_eq!(value["translated_text"], "hola");
        assert_eq!(value["source_lang"], "auto");
        assert_eq!(value["target_lang"], "es");
        assert!(value["timestamp"].is_string());
    }
}
