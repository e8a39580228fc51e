use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    db::{self, StoreError},
    pagination::{Page, Pagination},
    users::repo_types::{NewUser, User, UserChanges},
};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// User persistence. Reads never return soft-deleted rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list(&self, page: Pagination) -> Result<Page<User>, StoreError>;
    /// Returns `None` when the user is absent or soft-deleted.
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError>;
    /// Returns `false` when there was no active row to delete.
    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_insert)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let mut qb = db::active(&format!("SELECT {USER_COLUMNS} FROM users"));
        qb.push(" AND id = ").push_bind(id);
        Ok(qb.build_query_as::<User>().fetch_optional(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut qb = db::active(&format!("SELECT {USER_COLUMNS} FROM users"));
        qb.push(" AND lower(email) = lower(")
            .push_bind(email.to_string())
            .push(")");
        Ok(qb.build_query_as::<User>().fetch_optional(&self.db).await?)
    }

    async fn list(&self, page: Pagination) -> Result<Page<User>, StoreError> {
        let mut count = db::active("SELECT COUNT(*) FROM users");
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.db)
            .await?;

        let mut qb = db::active(&format!("SELECT {USER_COLUMNS} FROM users"));
        qb.push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = qb.build_query_as::<User>().fetch_all(&self.db).await?;

        Ok(Page { items, total })
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = now()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(email) = &changes.email {
            qb.push(", email = ").push_bind(email.clone());
        }
        if let Some(hash) = &changes.password_hash {
            qb.push(", password_hash = ").push_bind(hash.clone());
        }
        db::push_active(&mut qb);
        qb.push(" AND id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        qb.build_query_as::<User>()
            .fetch_optional(&self.db)
            .await
            .map_err(StoreError::from_insert)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("UPDATE users SET deleted_at = now(), updated_at = now()");
        db::push_active(&mut qb);
        qb.push(" AND id = ").push_bind(id);
        let res = qb.build().execute(&self.db).await?;
        Ok(res.rows_affected() > 0)
    }
}
