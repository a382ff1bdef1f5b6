use std::sync::Arc;

use redis::aio::ConnectionManager;

use crate::config::{Backend, Config};
use crate::error::{AppError, Result};
use crate::repositories::{
    memory::{MemorySessionStore, MemorySnippetStore, MemoryUserStore},
    session::{RedisSessionStore, SessionStore},
    snippet::{PgSnippetStore, SnippetStore},
    user::{PgUserStore, UserStore},
};
use crate::services::chat::ChatHub;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Snippet records.
    pub snippets: Arc<dyn SnippetStore>,
    /// User accounts.
    pub users: Arc<dyn UserStore>,
    /// Server-side session data.
    pub sessions: Arc<dyn SessionStore>,
    /// Live chat connections.
    pub chat: ChatHub,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        if crate::crypto::password::warm_up() {
            tracing::info!("✅ Login timing hash prepared");
        } else {
            tracing::error!("❌ Could not prepare login timing hash");
        }

        match config.backend {
            Backend::Memory => {
                tracing::warn!("⚠️ Using in-memory stores, data is lost on restart");
                Ok(Self::in_memory(config.clone()))
            }
            Backend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| AppError::Internal("DATABASE_URL is not set".to_string()))?;
                let db = crate::db::create_pool(url)?;
                crate::db::run_migrations(&db).await?;
                tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

                let redis_client = redis::Client::open(config.redis_url.as_str())?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis Connection Manager initialized");

                Ok(AppState {
                    config: config.clone(),
                    snippets: Arc::new(PgSnippetStore::new(db.clone())),
                    users: Arc::new(PgUserStore::new(db)),
                    sessions: Arc::new(RedisSessionStore::new(redis)),
                    chat: ChatHub::new(),
                })
            }
        }
    }

    /// State backed entirely by process-local stores.
    pub fn in_memory(config: Config) -> Self {
        AppState {
            config,
            snippets: Arc::new(MemorySnippetStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            chat: ChatHub::new(),
        }
    }
}
