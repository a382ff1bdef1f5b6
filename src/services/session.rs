use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    crypto::token::generate_token,
    error::Result,
    models::session::SessionData,
    repositories::session::SessionStore,
};

struct SessionState {
    token: Option<String>,
    data: SessionData,
    modified: bool,
}

/// Request-scoped handle on the caller's session.
///
/// Reads and writes hit the in-memory copy; the session middleware persists
/// it once the handler returns. Cloning shares the same state.
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Wraps data loaded for `token`. `None` means no session exists yet.
    pub fn new(store: Arc<dyn SessionStore>, token: Option<String>, data: SessionData) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                token,
                data,
                modified: false,
            })),
            store,
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.state.lock().await.token.clone()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.state.lock().await.data.values.get(key).cloned()
    }

    pub async fn put(&self, key: &str, value: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.data.values.insert(key.to_string(), value.into());
        state.modified = true;
    }

    pub async fn remove(&self, key: &str) {
        let mut state = self.state.lock().await;
        if state.data.values.remove(key).is_some() {
            state.modified = true;
        }
    }

    /// Reads and removes `key` in one step (flash messages).
    pub async fn pop(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock().await;
        let value = state.data.values.remove(key);
        if value.is_some() {
            state.modified = true;
        }
        value
    }

    /// Issues a fresh token and drops the old one from the store.
    ///
    /// Fails without touching the in-memory data if the store refuses the
    /// delete, so callers can bail out before writing privileged state.
    pub async fn renew_token(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(old) = state.token.as_deref() {
            self.store.delete(old).await?;
        }
        state.token = Some(generate_token());
        state.modified = true;
        tracing::debug!("🔑 Session token rotated");
        Ok(())
    }

    /// Persists modified data.
    ///
    /// # Returns
    ///
    /// The token the client must hold from now on, or `None` when nothing
    /// changed and the cookie can stay as it is.
    pub async fn commit(&self, ttl_secs: u64) -> Result<Option<String>> {
        let mut state = self.state.lock().await;
        if !state.modified {
            return Ok(None);
        }
        let token = match state.token.clone() {
            Some(token) => token,
            None => {
                let token = generate_token();
                state.token = Some(token.clone());
                token
            }
        };
        self.store.save(&token, &state.data, ttl_secs).await?;
        state.modified = false;
        Ok(Some(token))
    }
}
