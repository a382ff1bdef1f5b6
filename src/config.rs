use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Which storage stack backs the record and session stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL for records, Redis for sessions.
    Postgres,
    /// Process-local stores. Nothing survives a restart.
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            other => anyhow::bail!("Unknown BACKEND `{}` (expected postgres or memory)", other),
        }
    }
}

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The storage stack to use.
    pub backend: Backend,
    /// The URL of the PostgreSQL database. Required for the postgres backend.
    pub database_url: Option<String>,
    /// The URL of the Redis server.
    pub redis_url: String,
    /// How long an idle session lives, in hours.
    pub session_duration_hours: i64,
    /// The socket address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Marks cookies `Secure` when true.
    pub secure_cookies: bool,
    /// Enables the per-IP rate limiter on login and signup submissions.
    pub auth_rate_limit: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let backend: Backend = env::var("BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        if backend == Backend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when BACKEND=postgres");
        }

        Ok(Self {
            backend,
            database_url,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            session_duration_hours: env::var("SESSION_DURATION_HOURS")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .context("Invalid SESSION_DURATION_HOURS")?,
            listen_addr: env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:4000".to_string())
                .parse()
                .context("Invalid LISTEN_ADDR")?,
            secure_cookies: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string())
                == "production",
            auth_rate_limit: env::var("AUTH_RATE_LIMIT")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("Invalid AUTH_RATE_LIMIT")?,
        })
    }

    /// A memory-backed configuration with the rate limiter off.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            database_url: None,
            redis_url: String::new(),
            session_duration_hours: 12,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            secure_cookies: false,
            auth_rate_limit: false,
        }
    }

    /// Session lifetime in seconds.
    pub fn session_ttl_secs(&self) -> u64 {
        (self.session_duration_hours.max(1) as u64).saturating_mul(3600)
    }
}
