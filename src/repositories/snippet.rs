use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::{AppError, Result},
    models::snippet::Snippet,
};

const SNIPPET_COLUMNS: &str = "id, title, content, author_name, created, expires, updated_at";

/// Data access for snippets.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Writes a new snippet expiring `expires_days` from now and returns its id.
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
        author_name: &str,
    ) -> Result<i64>;

    /// Returns the snippet if it exists and has not expired, `NotFound` otherwise.
    async fn get(&self, id: i64) -> Result<Snippet>;

    /// Up to ten live snippets.
    ///
    /// Ordered by ascending id, i.e. the oldest live rows first. This is what
    /// the home page has always shown; see DESIGN.md before changing it.
    async fn latest(&self) -> Result<Vec<Snippet>>;

    /// Overwrites every editable field, refreshes `updated_at` and recomputes
    /// the expiry from now. Returns `id`.
    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        expires_days: i32,
        author_name: &str,
    ) -> Result<i64>;

    /// Hard delete. Deleting an unknown id is not an error.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// `SnippetStore` backed by the `snippets` table.
#[derive(Clone)]
pub struct PgSnippetStore {
    pool: Pool,
}

impl PgSnippetStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetStore for PgSnippetStore {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
        author_name: &str,
    ) -> Result<i64> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO snippets (title, content, author_name, created, expires, updated_at)
                VALUES ($1, $2, $3, NOW(), NOW() + make_interval(days => $4), NOW())
                RETURNING id
                "#,
                &[&title, &content, &author_name, &expires_days],
            )
            .await?;
        let id: i64 = row.get("id");
        tracing::info!("✅ Snippet created with ID: {}", id);
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet> {
        let client = self.pool.get().await?;
        let query = format!(
            "SELECT {} FROM snippets WHERE expires > NOW() AND id = $1",
            SNIPPET_COLUMNS
        );
        let row = client
            .query_opt(query.as_str(), &[&id])
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(Snippet::from(&row))
    }

    async fn latest(&self) -> Result<Vec<Snippet>> {
        let client = self.pool.get().await?;
        let query = format!(
            "SELECT {} FROM snippets WHERE expires > NOW() ORDER BY id ASC LIMIT 10",
            SNIPPET_COLUMNS
        );
        let rows = client.query(query.as_str(), &[]).await?;
        Ok(rows.iter().map(Snippet::from).collect())
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        expires_days: i32,
        author_name: &str,
    ) -> Result<i64> {
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                UPDATE snippets
                SET
                    title = $1,
                    content = $2,
                    expires = NOW() + make_interval(days => $3),
                    updated_at = NOW(),
                    author_name = $4
                WHERE id = $5
                "#,
                &[&title, &content, &expires_days, &author_name, &id],
            )
            .await?;
        tracing::debug!("Snippet {} updated", id);
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM snippets WHERE id = $1", &[&id])
            .await?;
        tracing::debug!("Snippet {} delete affected {} row(s)", id, deleted);
        Ok(())
    }
}
