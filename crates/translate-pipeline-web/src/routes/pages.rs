//! Page routes - full HTML page renders.

use axum::extract::{Path, State};
use axum::response::Redirect;
use std::sync::Arc;
use tracing::info;

use super::session_url;
use crate::helpers::{OptionExt, RouteResult};
use crate::state::AppState;
use crate::templates::SessionTemplate;

/// Start a new session and send the browser to it.
pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    let session_id = state.create_session().await;
    info!("Created session {}", session_id);
    Redirect::to(&session_url(&session_id))
}

/// Render a session in its current phase.
///
/// Rendering consumes the session's pending notice, so it shows once.
pub async fn session_page(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<SessionTemplate> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let output_location = state.config.storage.output_location.clone();
    let max_text_bytes = state.config.translator.max_text_bytes;

    session
        .with_session_mut(|s| {
            SessionTemplate::render_state(
                session_id.clone(),
                &mut s.state,
                output_location,
                max_text_bytes,
            )
        })
        .await
        .or_not_found("Session not found")
}
