//! Process-local stores for the `memory` backend and for tests.
//!
//! They follow the same contracts as the Postgres and Redis stores,
//! including expiry and the unique email constraint.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    crypto::password,
    error::{AppError, Result},
    models::{session::SessionData, snippet::Snippet, user::User},
    repositories::{
        session::SessionStore,
        snippet::SnippetStore,
        user::{check_credentials, UserStore},
    },
};

struct SnippetRows {
    rows: BTreeMap<i64, Snippet>,
    last_id: i64,
    clock_skew: chrono::Duration,
}

impl Default for SnippetRows {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
            clock_skew: chrono::Duration::zero(),
        }
    }
}

impl SnippetRows {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + self.clock_skew
    }
}

/// In-memory `SnippetStore`.
#[derive(Default)]
pub struct MemorySnippetStore {
    inner: RwLock<SnippetRows>,
}

impl MemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves this store's notion of "now" forward.
    pub async fn advance_clock(&self, by: chrono::Duration) {
        self.inner.write().await.clock_skew += by;
    }

    /// Number of rows held, expired ones included.
    pub async fn row_count(&self) -> usize {
        self.inner.read().await.rows.len()
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
        author_name: &str,
    ) -> Result<i64> {
        let mut inner = self.inner.write().await;
        let now = inner.now();
        inner.last_id += 1;
        let id = inner.last_id;
        inner.rows.insert(
            id,
            Snippet {
                id,
                title: title.to_string(),
                content: content.to_string(),
                author_name: author_name.to_string(),
                created: now,
                expires: now + chrono::Duration::days(i64::from(expires_days)),
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet> {
        let inner = self.inner.read().await;
        let now = inner.now();
        inner
            .rows
            .get(&id)
            .filter(|s| s.is_live_at(now))
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>> {
        let inner = self.inner.read().await;
        let now = inner.now();
        Ok(inner
            .rows
            .values()
            .filter(|s| s.is_live_at(now))
            .take(10)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        expires_days: i32,
        author_name: &str,
    ) -> Result<i64> {
        let mut inner = self.inner.write().await;
        let now = inner.now();
        if let Some(snippet) = inner.rows.get_mut(&id) {
            // updated_at never moves backwards or stands still
            let updated_at = if now > snippet.updated_at {
                now
            } else {
                snippet.updated_at + chrono::Duration::microseconds(1)
            };
            snippet.title = title.to_string();
            snippet.content = content.to_string();
            snippet.author_name = author_name.to_string();
            snippet.expires = now + chrono::Duration::days(i64::from(expires_days));
            snippet.updated_at = updated_at;
        }
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
struct UserRows {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

impl UserRows {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// In-memory `UserStore`.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<UserRows>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let hashed_password = password::hash_password(password)?;
        let mut inner = self.inner.write().await;
        if inner.email_taken(email, None) {
            return Err(AppError::DuplicateEmail);
        }
        inner.last_id += 1;
        let id = inner.last_id;
        inner.rows.insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                hashed_password,
                created: Utc::now(),
            },
        );
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64> {
        let found = {
            let inner = self.inner.read().await;
            inner
                .rows
                .values()
                .find(|u| u.email == email)
                .map(|u| (u.id, u.hashed_password.clone()))
        };
        check_credentials(found, password)
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.inner.read().await.rows.contains_key(&id))
    }

    async fn get(&self, id: i64) -> Result<User> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, id: i64, name: &str, email: &str) -> Result<i64> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(email, Some(id)) {
            return Err(AppError::DuplicateEmail);
        }
        if let Some(user) = inner.rows.get_mut(&id) {
            user.name = name.to_string();
            user.email = email.to_string();
        }
        Ok(id)
    }
}

/// In-memory `SessionStore` with per-entry deadlines.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (SessionData, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, token: &str) -> Result<Option<SessionData>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(token)
            .filter(|(_, deadline)| Instant::now() < *deadline)
            .map(|(data, _)| data.clone()))
    }

    async fn save(&self, token: &str, data: &SessionData, ttl_secs: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(ttl_secs);
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, d)| Instant::now() < *d);
        sessions.insert(token.to_string(), (data.clone(), deadline));
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
