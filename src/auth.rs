use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::watch;

use crate::error::AppError;
use crate::state::AppState;

/// Handle on the identity provider: the current user id plus a change
/// notification. The provider itself (sign-up, credentials, tokens) lives
/// outside this service; we only observe who is signed in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    tx: watch::Sender<Option<String>>,
    /// Stable per-session identity. Live subscriptions are deduplicated
    /// within a session (a view re-subscribing its own query), never
    /// across sessions.
    id: std::sync::Arc<String>,
}

impl AuthSession {
    /// A session with nobody signed in.
    pub fn signed_out() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            id: std::sync::Arc::new(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// A session fixed to a known user, e.g. one derived from an
    /// authenticated HTTP request.
    pub fn for_user(user_id: &str) -> Self {
        let session = Self::signed_out();
        session.sign_in(user_id);
        session
    }

    pub fn session_id(&self) -> &str {
        &self.id
    }

    pub fn sign_in(&self, user_id: &str) {
        self.tx.send_replace(Some(user_id.to_string()));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Receiver that fires whenever the signed-in user changes.
    pub fn watch(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

/// Extracts the calling user's id from the `x-user-id` header set by the
/// fronting auth layer. Requests without it are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match user_id {
            Some(id) => Ok(CurrentUser(id.to_string())),
            None => Err(AppError::Unauthorized("Missing user identity".into())),
        }
    }
}
