//! Askama templates for the front-end.
//!
//! - `base.html` - Common layout with CSS/JS
//! - `session.html` - Input form or result view, plus history

use askama::Template;
use askama_web::WebTemplate;
use translate_pipeline_core::{
    flag_for_lang, target_languages, LanguageOption, TranslationResult, DEFAULT_TARGET_LANG,
};

use crate::session::{Notice, Phase, SessionState};

/// A translation result prepared for display.
pub struct ResultView {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub source_flag: &'static str,
    pub target_lang: String,
    pub target_flag: &'static str,
    pub timestamp: String,
    pub char_count: usize,
}

impl From<&TranslationResult> for ResultView {
    fn from(result: &TranslationResult) -> Self {
        Self {
            original_text: result.original_text.clone(),
            translated_text: result.translated_text.clone(),
            source_lang: result.source_lang.to_string(),
            source_flag: flag_for_lang(result.source_lang.as_str()),
            target_lang: result.target_lang.to_string(),
            target_flag: flag_for_lang(result.target_lang.as_str()),
            timestamp: result.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            char_count: result.char_count(),
        }
    }
}

/// The whole session page.
#[derive(Template, WebTemplate)]
#[template(path = "session.html")]
pub struct SessionTemplate {
    pub session_id: String,
    pub show_result: bool,
    pub current: Option<ResultView>,
    pub notice_class: &'static str,
    pub notice_message: Option<String>,
    pub history: Vec<ResultView>,
    pub target_languages: Vec<LanguageOption>,
    pub default_target: &'static str,
    pub output_location: String,
    pub max_text_bytes: usize,
}

impl SessionTemplate {
    /// Build the page from session state, consuming its pending notice.
    pub fn render_state(
        session_id: String,
        state: &mut SessionState,
        output_location: String,
        max_text_bytes: usize,
    ) -> Self {
        let notice = state.take_notice();
        Self {
            session_id,
            show_result: state.phase() == Phase::Result,
            current: state.current().map(ResultView::from),
            notice_class: notice.as_ref().map_or("", Notice::css_class),
            notice_message: notice.map(|n| n.message().to_string()),
            history: state
                .history_newest_first()
                .iter()
                .map(ResultView::from)
                .collect(),
            target_languages: target_languages(),
            default_target: DEFAULT_TARGET_LANG,
            output_location,
            max_text_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use translate_pipeline_core::Lang;

    #[test]
    fn test_input_page_renders_form_and_notice() {
        let mut state = SessionState::new();
        state.set_notice(Notice::Warning("Please enter text or upload a file!".into()));
        let page = SessionTemplate::render_state("abc".into(), &mut state, "out".into(), 5000);

        let html = page.render().unwrap();
        assert!(html.contains("/api/translate/abc"));
        assert!(html.contains("Please enter text or upload a file!"));
        assert!(html.contains("notice-warning"));
        assert!(html.contains(r#"value="sw""#));
        assert!(state.take_notice().is_none());
    }

    #[test]
    fn test_result_page_shows_both_texts_and_history() {
        let mut state = SessionState::new();
        state.complete(TranslationResult::new(
            "Bonjour",
            "Hola",
            Lang::new("fr"),
            Lang::new("es"),
        ));
        let page = SessionTemplate::render_state("abc".into(), &mut state, "out".into(), 5000);
        assert!(page.show_result);
        assert_eq!(page.history.len(), 1);

        let html = page.render().unwrap();
        assert!(html.contains("Bonjour"));
        assert!(html.contains("Hola"));
        assert!(html.contains("/api/reset/abc"));
        assert!(!html.contains("/api/translate/abc"));
    }
}
