//! Per-session front-end state and its transitions.
//!
//! ```text
//! Input --(successful translation)--> Result
//! Result --(New Translation)--------> Input
//! ```

use translate_pipeline_core::TranslationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Input,
    Result,
}

/// Banner shown once on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }

    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Warning(_) => "notice-warning",
            Self::Error(_) => "notice-error",
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    phase: Phase,
    /// Result shown in the result phase
    current: Option<TranslationResult>,
    /// Completed translations, oldest first
    history: Vec<TranslationResult>,
    notice: Option<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn current(&self) -> Option<&TranslationResult> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[TranslationResult] {
        &self.history
    }

    /// History newest first, for display.
    pub fn history_newest_first(&self) -> Vec<TranslationResult> {
        self.history.iter().rev().cloned().collect()
    }

    /// `Input -> Result`. The result always joins the history; outside the
    /// input phase it is not shown and false is returned.
    pub fn complete(&mut self, result: TranslationResult) -> bool {
        if self.phase != Phase::Input {
            self.history.push(result);
            return false;
        }
        self.history.push(result.clone());
        self.current = Some(result);
        self.notice = None;
        self.phase = Phase::Result;
        true
    }

    /// `Result -> Input`, clearing the displayed result but keeping history.
    pub fn reset(&mut self) -> bool {
        if self.phase != Phase::Result {
            return false;
        }
        self.current = None;
        self.notice = None;
        self.phase = Phase::Input;
        true
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Take the pending notice, if any; it is shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use translate_pipeline_core::Lang;

    fn result(text: &str) -> TranslationResult {
        TranslationResult::new(text, format!("{text}!"), Lang::new("fr"), Lang::new("es"))
    }

    #[test]
    fn test_starts_in_input_phase() {
        let state = SessionState::new();
        assert_eq!(state.phase(), Phase::Input);
        assert!(state.current().is_none());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_complete_then_reset() {
        let mut state = SessionState::new();
        state.set_notice(Notice::Error("earlier failure".into()));

        assert!(state.complete(result("a")));
        assert_eq!(state.phase(), Phase::Result);
        assert_eq!(state.current().unwrap().original_text, "a");
        assert!(state.take_notice().is_none());

        // A second completion without reset is not a transition, but the
        // translation still lands in history
        assert!(!state.complete(result("b")));
        assert_eq!(state.current().unwrap().original_text, "a");
        assert_eq!(state.history().len(), 2);

        assert!(state.reset());
        assert_eq!(state.phase(), Phase::Input);
        assert!(state.current().is_none());
        assert_eq!(state.history().len(), 2);
        assert!(!state.reset());
    }

    #[test]
    fn test_history_display_order() {
        let mut state = SessionState::new();
        for text in ["first", "second", "third"] {
            state.complete(result(text));
            state.reset();
        }
        let shown: Vec<_> = state
            .history_newest_first()
            .into_iter()
            .map(|r| r.original_text)
            .collect();
        assert_eq!(shown, ["third", "second", "first"]);
    }

    #[test]
    fn test_notice_is_shown_once() {
        let mut state = SessionState::new();
        state.set_notice(Notice::Warning("careful".into()));
        assert_eq!(state.take_notice().unwrap().message(), "careful");
        assert!(state.take_notice().is_none());
    }
}
