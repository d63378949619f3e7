use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use translate_pipeline_core::AppConfig;
use uuid::Uuid;

use crate::session::SessionState;
use crate::submit::Submitter;

/// Sessions idle longer than this are dropped by [`AppState::cleanup_old_sessions`].
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(3600);

/// One browser session of the front-end.
pub struct Session {
    pub state: SessionState,
    /// Refreshed on every mutable access
    pub last_active: Instant,
}

/// Global application state
pub struct AppState {
    /// Active sessions indexed by UUID
    sessions: RwLock<HashMap<Uuid, Session>>,
    pub submitter: Submitter,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(submitter: Submitter, config: AppConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            submitter,
            config,
        }
    }

    /// Create a new session in the input phase.
    ///
    /// Returns the session ID as a string (for URL embedding).
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4();
        let session = Session {
            state: SessionState::new(),
            last_active: Instant::now(),
        };
        self.sessions.write().await.insert(id, session);
        id.to_string()
    }

    /// Get a session by ID string.
    ///
    /// Returns `None` if the ID is not a valid UUID or session doesn't exist.
    pub async fn get_session(&self, id: &str) -> Option<SessionRef<'_>> {
        let uuid = Uuid::parse_str(id).ok()?;
        let sessions = self.sessions.read().await;
        sessions.contains_key(&uuid).then_some(SessionRef {
            id: uuid,
            state: self,
        })
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for `max_age` or longer; returns how many were removed.
    pub async fn cleanup_old_sessions(&self, max_age: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, session| now.duration_since(session.last_active) < max_age);
        before - sessions.len()
    }
}

/// A borrowed reference to a session.
///
/// Locks are only taken inside the synchronous closures passed to
/// [`SessionRef::with_session`] and [`SessionRef::with_session_mut`], so no
/// guard is ever held across an `.await`.
///
/// ```ignore
/// let phase = session.with_session(|s| s.state.phase()).await?;
/// let result = state.submitter.submit(submission).await;
/// session.with_session_mut(|s| s.state.complete(result)).await;
/// ```
pub struct SessionRef<'a> {
    id: Uuid,
    state: &'a AppState,
}

impl SessionRef<'_> {
    /// Access session data immutably within a closure.
    pub async fn with_session<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Session) -> R,
    {
        let sessions = self.state.sessions.read().await;
        sessions.get(&self.id).map(f)
    }

    /// Access session data mutably within a closure, marking it active.
    pub async fn with_session_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.state.sessions.write().await;
        sessions.get_mut(&self.id).map(|session| {
            session.last_active = Instant::now();
            f(session)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use translate_pipeline_core::{MemoryObjectStore, TranslatorConfig, create_translator};

    fn app_state() -> AppState {
        let config = AppConfig::default();
        let translator = create_translator(&TranslatorConfig::default()).unwrap();
        let submitter = Submitter::new(
            Arc::new(MemoryObjectStore::new()),
            translator,
            &config.storage,
        );
        AppState::new(submitter, config)
    }

    #[tokio::test]
    async fn test_session_lookup() {
        let state = app_state();
        let id = state.create_session().await;

        assert!(state.get_session(&id).await.is_some());
        assert!(state.get_session("not-a-uuid").await.is_none());
        assert!(state
            .get_session(&Uuid::new_v4().to_string())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_cleanup_drops_only_idle_sessions() {
        let state = app_state();
        let old = state.create_session().await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        let fresh = state.create_session().await;

        assert_eq!(state.cleanup_old_sessions(Duration::from_millis(100)).await, 1);
        assert!(state.get_session(&old).await.is_none());
        assert!(state.get_session(&fresh).await.is_some());
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_active_session_survives_cleanup() {
        let state = app_state();
        let id = state.create_session().await;
        let session = state.get_session(&id).await.unwrap();

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.with_session_mut(|s| s.state.reset()).await.unwrap();
        }

        // Created 200ms ago but last touched just now
        assert_eq!(state.cleanup_old_sessions(Duration::from_millis(150)).await, 0);
        assert!(state.get_session(&id).await.is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(state.cleanup_old_sessions(Duration::from_millis(150)).await, 1);
        assert!(state.get_session(&id).await.is_none());
    }
}
