//! HTTP route handlers.
//!
//! Routes are organized by function:
//! - `pages` - Full page renders (index, session page)
//! - `translate` - Form submissions (translate, reset)

mod pages;
mod translate;

pub use pages::{index, session_page};
pub use translate::{reset_session, translate};

/// URL of a session's page.
pub fn session_url(session_id: &str) -> String {
    format!("/session/{session_id}")
}
