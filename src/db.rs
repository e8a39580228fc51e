use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::config::AppConfig;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps a unique violation on the active-email index to `DuplicateEmail`.
    pub fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Self::DuplicateEmail
            }
            _ => Self::Database(err),
        }
    }
}

/// Starts `head` with the soft-delete guard; callers continue with `AND ...`.
pub fn active<'a>(head: &str) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(head);
    push_active(&mut qb);
    qb
}

/// Every statement against `users` or `movies` filters through here.
pub fn push_active(qb: &mut QueryBuilder<'_, Postgres>) {
    qb.push(" WHERE deleted_at IS NULL");
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }
}
