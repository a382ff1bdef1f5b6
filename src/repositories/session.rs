use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::{
    error::{AppError, Result},
    models::session::SessionData,
};

/// Persistence for session data, keyed by the session token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The data stored under `token`, or `None` if absent or expired.
    async fn load(&self, token: &str) -> Result<Option<SessionData>>;

    /// Stores `data` under `token` for `ttl_secs` seconds.
    async fn save(&self, token: &str, data: &SessionData, ttl_secs: u64) -> Result<()>;

    /// Forgets `token`. Unknown tokens are ignored.
    async fn delete(&self, token: &str) -> Result<()>;
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// `SessionStore` keeping JSON blobs in Redis under `session:<token>`.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, token: &str) -> Result<Option<SessionData>> {
        let mut redis = self.redis.clone();
        let json: Option<String> = redis.get(session_key(token)).await?;

        match json {
            Some(json) => match sonic_rs::from_str::<SessionData>(&json) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    tracing::warn!("❌ Invalid session JSON, starting fresh: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, token: &str, data: &SessionData, ttl_secs: u64) -> Result<()> {
        let json = sonic_rs::to_string(data)
            .map_err(|e| AppError::Session(format!("Session serialization failed: {}", e)))?;

        let mut redis = self.redis.clone();
        let _: () = redis
            .set_ex(session_key(token), json, ttl_secs)
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis set_ex failed: {}", e);
                AppError::Redis(e)
            })?;
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(session_key(token)).await?;
        Ok(())
    }
}
