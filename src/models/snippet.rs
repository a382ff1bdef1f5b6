use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A stored text record that stops being visible once `expires` passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// The unique identifier for the snippet.
    pub id: i64,
    /// The snippet title, at most 100 characters.
    pub title: String,
    /// The snippet body.
    pub content: String,
    /// Free-form author name supplied with the form.
    pub author_name: String,
    /// The timestamp when the snippet was created.
    pub created: DateTime<Utc>,
    /// The snippet is hidden from reads at and after this instant.
    pub expires: DateTime<Utc>,
    /// The timestamp of the last update (equals `created` until edited).
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    /// Whether the snippet is still visible at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }
}

impl From<&Row> for Snippet {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            author_name: row.get("author_name"),
            created: row.get("created"),
            expires: row.get("expires"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Lifetimes a snippet may be created with, in days.
pub const PERMITTED_EXPIRY_DAYS: [i32; 3] = [1, 7, 365];

/// Expiry preselected on a blank create form.
pub const DEFAULT_EXPIRY_DAYS: i32 = 365;
