use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                     // unique user ID
    pub name: String,                // display name
    pub email: String,               // normalized email
    pub password_hash: String,       // Argon2 hash, never leaves the server
    pub created_at: OffsetDateTime,  // creation timestamp
    pub updated_at: OffsetDateTime,  // last modification
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Already-validated column changes; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
