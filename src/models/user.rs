use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// Represents a user in the system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i64,
    /// The user's display name.
    pub name: String,
    /// The user's email address. Unique across users.
    pub email: String,
    /// The argon2id PHC string. Never the plaintext password.
    pub hashed_password: String,
    /// The timestamp when the user was created.
    pub created: DateTime<Utc>,
}

impl From<&Row> for User {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            hashed_password: row.get("hashed_password"),
            created: row.get("created"),
        }
    }
}
