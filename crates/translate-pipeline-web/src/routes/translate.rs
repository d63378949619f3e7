//! Form submissions - translate and reset (POST-Redirect-GET).

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use translate_pipeline_core::{is_target_language, Error, Lang, DEFAULT_TARGET_LANG};

use super::session_url;
use crate::helpers::{redirect_after_post, OptionExt, ResultExt, RouteResult};
use crate::session::{Notice, Phase};
use crate::state::AppState;
use crate::submit::{Submission, UploadedFile};

/// Collect the input form's fields.
///
/// A file part with no name and no content is what browsers send when no
/// file was chosen; it counts as no file.
async fn read_submission(mut multipart: Multipart) -> RouteResult<Submission> {
    let mut text = String::new();
    let mut file = None;
    let mut target_lang = Lang::new(DEFAULT_TARGET_LANG);

    while let Some(field) = multipart.next_field().await.or_bad_request()? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "text" => text = field.text().await.or_bad_request()?,
            "target_lang" => {
                let code = field.text().await.or_bad_request()?;
                if !code.is_empty() {
                    if !is_target_language(&code) {
                        return Err((
                            StatusCode::BAD_REQUEST,
                            format!("Unsupported target language: {code}"),
                        ));
                    }
                    target_lang = Lang::new(code);
                }
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.or_bad_request()?;
                if !file_name.is_empty() || !data.is_empty() {
                    file = Some(UploadedFile {
                        name: file_name,
                        data,
                    });
                }
            }
            other => debug!("Ignoring form field {}", other),
        }
    }

    Ok(Submission {
        text,
        file,
        target_lang,
    })
}

/// Submit the input form.
///
/// Success moves the session to the result phase. An empty submission leaves
/// a warning and any other failure an error notice; the session stays in the
/// input phase. Submissions while a result is shown are ignored.
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> RouteResult<Response> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;
    let url = session_url(&session_id);

    let phase = session
        .with_session(|s| s.state.phase())
        .await
        .or_not_found("Session not found")?;
    if phase != Phase::Input {
        debug!("Session {} is showing a result; ignoring submit", session_id);
        return redirect_after_post(&headers, &url);
    }

    let submission = read_submission(multipart).await?;

    // No lock is held while the submission runs
    let outcome = state.submitter.submit(submission).await;

    session
        .with_session_mut(|s| match outcome {
            Ok(result) => {
                info!(
                    "Session {}: translated {} characters to {}",
                    session_id,
                    result.char_count(),
                    result.target_lang
                );
                if !s.state.complete(result) {
                    warn!(
                        "Session {}: another submission finished first; result kept in history only",
                        session_id
                    );
                }
            }
            Err(e @ Error::NothingToTranslate) => {
                warn!("Session {}: {}", session_id, e);
                s.state.set_notice(Notice::Warning(e.to_string()));
            }
            Err(e) => {
                error!("Session {}: translation failed ({:?}): {}", session_id, e.kind(), e);
                s.state
                    .set_notice(Notice::Error(format!("Translation failed: {e}")));
            }
        })
        .await
        .or_not_found("Session not found")?;

    redirect_after_post(&headers, &url)
}

/// "New Translation": back to the input phase, history kept.
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let changed = session
        .with_session_mut(|s| s.state.reset())
        .await
        .or_not_found("Session not found")?;
    if !changed {
        debug!("Session {} already in input phase", session_id);
    }

    redirect_after_post(&headers, &session_url(&session_id))
}
