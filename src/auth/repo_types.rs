use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                      // assigned by the store
    pub full_name: String,            // display name
    pub email: String,                // normalized (trimmed, lowercase), unique
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 PHC string, not exposed in JSON
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Fields written by an edit. `password_hash` is `None` when the current hash is kept.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub updated_at: OffsetDateTime,
}
