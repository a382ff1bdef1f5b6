use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::{
    crypto::password,
    error::{AppError, Result},
    models::user::User,
};

const USER_COLUMNS: &str = "id, name, email, hashed_password, created";
const EMAIL_CONSTRAINT: &str = "users_uc_email";

/// Data access for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Hashes `password` and stores a new user. `DuplicateEmail` when the
    /// email is taken.
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<()>;

    /// Returns the user id when the credentials match, `InvalidCredentials`
    /// for an unknown email or a wrong password alike.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64>;

    async fn exists(&self, id: i64) -> Result<bool>;

    async fn get(&self, id: i64) -> Result<User>;

    /// Every user, ordered by id.
    async fn list(&self) -> Result<Vec<User>>;

    /// Changes name and email only. `DuplicateEmail` when the new email is
    /// taken by someone else.
    async fn update(&self, id: i64, name: &str, email: &str) -> Result<i64>;
}

/// Turns a looked-up `(id, hash)` into the authentication outcome.
///
/// A missing user still pays for one hash verification.
pub(crate) fn check_credentials(found: Option<(i64, String)>, password: &str) -> Result<i64> {
    match found {
        Some((id, hash)) => {
            if password::verify_password(password, &hash)? {
                tracing::info!("✅ User authenticated: {}", id);
                Ok(id)
            } else {
                Err(AppError::InvalidCredentials)
            }
        }
        None => {
            password::verify_dummy(password);
            Err(AppError::InvalidCredentials)
        }
    }
}

fn map_unique_violation(e: tokio_postgres::Error) -> AppError {
    let is_duplicate_email = e.code() == Some(&SqlState::UNIQUE_VIOLATION)
        && e.as_db_error()
            .and_then(|db| db.constraint())
            .is_some_and(|c| c == EMAIL_CONSTRAINT);

    if is_duplicate_email {
        AppError::DuplicateEmail
    } else {
        AppError::Database(e)
    }
}

/// `UserStore` backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let hashed_password = password::hash_password(password)?;
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                INSERT INTO users (name, email, hashed_password, created)
                VALUES ($1, $2, $3, NOW())
                "#,
                &[&name, &email, &hashed_password],
            )
            .await
            .map_err(map_unique_violation)?;
        tracing::info!("✅ User created: {}", email);
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64> {
        let client = self.pool.get().await?;
        let found = client
            .query_opt(
                "SELECT id, hashed_password FROM users WHERE email = $1",
                &[&email],
            )
            .await?
            .map(|row| (row.get::<_, i64>("id"), row.get::<_, String>("hashed_password")));
        check_credentials(found, password)
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_one("SELECT EXISTS(SELECT true FROM users WHERE id = $1)", &[&id])
            .await?;
        Ok(row.get(0))
    }

    async fn get(&self, id: i64) -> Result<User> {
        let client = self.pool.get().await?;
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = client
            .query_opt(query.as_str(), &[&id])
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(User::from(&row))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let client = self.pool.get().await?;
        let query = format!("SELECT {} FROM users ORDER BY id ASC", USER_COLUMNS);
        let rows = client.query(query.as_str(), &[]).await?;
        Ok(rows.iter().map(User::from).collect())
    }

    async fn update(&self, id: i64, name: &str, email: &str) -> Result<i64> {
        let client = self.pool.get().await?;
        client
            .execute(
                "UPDATE users SET name = $1, email = $2 WHERE id = $3",
                &[&name, &email, &id],
            )
            .await
            .map_err(map_unique_violation)?;
        tracing::debug!("User {} updated", id);
        Ok(id)
    }
}
