use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

use crate::infrastructure::security::generate_session_token;

/// Process-wide map from opaque session token to the authenticated
/// email. An injected instance, not a global; state lives only as long
/// as the process. Several sessions may map to the same email
/// (multi-device login).
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records a fresh session for `email` and returns its token.
    #[instrument(skip(self))]
    pub async fn create(&self, email: &str) -> String {
        let token = generate_session_token();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), email.to_string());
        debug!(email = email, "Session created");
        token
    }

    /// Unknown or stale tokens resolve to None (anonymous).
    pub async fn resolve(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Idempotent; destroying an unknown token is a no-op.
    #[instrument(skip(self, token))]
    pub async fn destroy(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(token).is_some() {
            debug!("Session destroyed");
        } else {
            trace!("Destroy of unknown session token ignored");
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
