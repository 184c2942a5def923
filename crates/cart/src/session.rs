//! Authentication session handle shared by the engine and the API client.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::RwLock;

/// Cheap-clone handle owning the authentication signal.
///
/// A logged-in session holds the bearer token the API client attaches to
/// every request. The engine consults [`Session::is_authenticated`] to decide
/// whether remote sync calls should happen at all; an unauthenticated session
/// keeps the cart fully local.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    token: RwLock<Option<SecretString>>,
}

impl Session {
    /// Create a session, optionally pre-authenticated with a bearer token.
    #[must_use]
    pub fn new(token: Option<SecretString>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(token),
            }),
        }
    }

    /// Store the bearer token obtained from a completed login.
    pub async fn login(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Drop the bearer token.
    ///
    /// Callers logging a user out should also call
    /// `CartEngine::clear_local`; the session only owns the credential.
    pub async fn logout(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a bearer token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Current bearer token, if any.
    pub(crate) async fn token(&self) -> Option<SecretString> {
        self.inner.token.read().await.clone()
    }
}
