use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Language code as accepted by the translation service (ISO 639-1, with
/// optional regional variants). The literal `"auto"` means "let the service
/// decide".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

/// Marker used when the source language is unresolved.
pub const AUTO_LANG: &str = "auto";

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn auto() -> Self {
        Self::new(AUTO_LANG)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_auto(&self) -> bool {
        self.0 == AUTO_LANG
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Storage locations used by both entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for the filesystem store; each location is a subdirectory
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,

    /// Location that receives inputs (and triggers the pipeline)
    #[serde(default = "default_input_location")]
    pub input_location: String,

    /// Location that receives translation results
    #[serde(default = "default_output_location")]
    pub output_location: String,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_input_location() -> String {
    DEFAULT_INPUT_LOCATION.to_string()
}

fn default_output_location() -> String {
    DEFAULT_OUTPUT_LOCATION.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            input_location: default_input_location(),
            output_location: default_output_location(),
        }
    }
}

/// Translator backend configuration for OpenAI-compatible APIs.
///
/// Supports llama.cpp, Ollama, DeepSeek, OpenAI, and any other OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Byte ceiling for a single translation request
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
}

impl TranslatorConfig {
    /// Create a new translator config
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
            timeout_secs: default_timeout_secs(),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_max_text_bytes() -> usize {
    MAX_TEXT_BYTES
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/v1".to_string(),
            api_key: None,
            model: "default_model".to_string(),
            timeout_secs: default_timeout_secs(),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

/// Language detection backend. Shares the translator's endpoint; only the
/// model can differ.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub model: Option<String>,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Value of the `Function` dimension attached to every datum
    #[serde(default = "default_function_name")]
    pub function_name: String,
}

const fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    "Translate".to_string()
}

fn default_function_name() -> String {
    "LanguageTranslator".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: default_namespace(),
            function_name: default_function_name(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub translator: TranslatorConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, crate::error::Error> {
        let config: Self = toml::from_str(content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), crate::error::Error> {
        if self.storage.input_location.is_empty() {
            return Err(crate::error::Error::ConfigInvalid {
                field: "storage.input_location".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.storage.output_location.is_empty() {
            return Err(crate::error::Error::ConfigInvalid {
                field: "storage.output_location".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.translator.max_text_bytes == 0 {
            return Err(crate::error::Error::ConfigInvalid {
                field: "translator.max_text_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Load from default locations (~/.config/translate-pipeline/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("translate-pipeline").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

/// A language option for UI dropdowns
#[derive(Debug, Clone)]
pub struct LanguageOption {
    /// ISO language code (e.g., "en", "fr", "zh")
    pub code: &'static str,
    /// Display name (e.g., "English", "French")
    pub name: &'static str,
    /// Flag emoji
    pub flag: &'static str,
}

/// Languages offered as translation target in the interactive front-end.
pub fn target_languages() -> Vec<LanguageOption> {
    vec![
        LanguageOption { code: "es", name: "Spanish", flag: "🇪🇸" },
        LanguageOption { code: "fr", name: "French", flag: "🇫🇷" },
        LanguageOption { code: "de", name: "German", flag: "🇩🇪" },
        LanguageOption { code: "en", name: "English", flag: "🇬🇧" },
        LanguageOption { code: "zh", name: "Chinese", flag: "🇨🇳" },
        LanguageOption { code: "ja", name: "Japanese", flag: "🇯🇵" },
        LanguageOption { code: "ru", name: "Russian", flag: "🇷🇺" },
        LanguageOption { code: "sw", name: "Swahili", flag: "🇰🇪" },
    ]
}

/// Whether `code` is one of the front-end's target choices.
pub fn is_target_language(code: &str) -> bool {
    target_languages().iter().any(|l| l.code == code)
}

/// Default target language code (first entry of the choice list)
pub const DEFAULT_TARGET_LANG: &str = "es";
/// Default input location name
pub const DEFAULT_INPUT_LOCATION: &str = "translate-input-bucket";
/// Default output location name
pub const DEFAULT_OUTPUT_LOCATION: &str = "translate-output-bucket";
/// Byte ceiling of the reference translation service
pub const MAX_TEXT_BYTES: usize = 5000;

/// Get flag emoji for a language code.
///
/// Returns a globe emoji for unknown language codes.
pub fn flag_for_lang(code: &str) -> &'static str {
    match code {
        "auto" => "🔍",
        other => target_languages()
            .into_iter()
            .find(|l| l.code == other)
            .map_or("🌐", |l| l.flag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.input_location, DEFAULT_INPUT_LOCATION);
        assert_eq!(config.storage.output_location, DEFAULT_OUTPUT_LOCATION);
        assert_eq!(config.translator.max_text_bytes, 5000);
        assert_eq!(config.metrics.function_name, "LanguageTranslator");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [storage]
            input_location = "in"

            [translator]
            api_base = "http://example.test/v1"
            model = "m"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.input_location, "in");
        assert_eq!(config.storage.output_location, DEFAULT_OUTPUT_LOCATION);
        assert_eq!(config.translator.timeout_secs, 60);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_empty_location_rejected() {
        let err = AppConfig::from_toml("[storage]\noutput_location = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("storage.output_location"));
    }

    #[test]
    fn test_target_language_list() {
        let codes: Vec<_> = target_languages().iter().map(|l| l.code).collect();
        assert_eq!(codes, ["es", "fr", "de", "en", "zh", "ja", "ru", "sw"]);
        assert_eq!(codes[0], DEFAULT_TARGET_LANG);
        assert!(is_target_language("sw"));
        assert!(!is_target_language("it"));
    }

    #[test]
    fn test_flag_for_lang() {
        assert_eq!(flag_for_lang("fr"), "🇫🇷");
        assert_eq!(flag_for_lang("auto"), "🔍");
        assert_eq!(flag_for_lang("xx"), "🌐");
    }
}
