//! In-memory stores that honour the same contracts as the Postgres ones:
//! soft-deleted rows are kept but never returned, and active emails are unique.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::password::hash_password,
    db::StoreError,
    movies::{
        repo::MovieRepository,
        repo_types::{Movie, MoviePatch, NewMovie},
        search::MovieFilter,
    },
    pagination::{Page, Pagination},
    users::{
        repo::UserRepository,
        repo_types::{NewUser, User, UserChanges},
    },
};

struct Row<T> {
    value: T,
    deleted_at: Option<OffsetDateTime>,
}

impl<T> Row<T> {
    fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

fn paginate<T: Clone>(matching: Vec<&T>, page: Pagination) -> Page<T> {
    let total = matching.len() as i64;
    let items = matching
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect();
    Page { items, total }
}

#[derive(Default)]
struct UserTable {
    rows: Vec<Row<User>>,
    next_id: i64,
    hide_lookup: bool,
}

impl UserTable {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows.iter().any(|r| {
            r.is_active() && r.value.email.eq_ignore_ascii_case(email) && Some(r.value.id) != except
        })
    }

    fn active_mut(&mut self, id: i64) -> Option<&mut Row<User>> {
        self.rows
            .iter_mut()
            .find(|r| r.is_active() && r.value.id == id)
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    table: Mutex<UserTable>,
}

impl InMemoryUsers {
    /// Total rows including soft-deleted ones.
    pub fn row_count(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }

    /// Makes `find_by_email` miss, so only the unique constraint can catch duplicates.
    pub fn hide_emails_from_lookup(&self) {
        self.table.lock().unwrap().hide_lookup = true;
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.table.lock().unwrap();
        if t.email_taken(&new.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        t.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: t.next_id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        t.rows.push(Row {
            value: user.clone(),
            deleted_at: None,
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let t = self.table.lock().unwrap();
        Ok(t.rows
            .iter()
            .find(|r| r.is_active() && r.value.id == id)
            .map(|r| r.value.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.table.lock().unwrap();
        if t.hide_lookup {
            return Ok(None);
        }
        Ok(t.rows
            .iter()
            .find(|r| r.is_active() && r.value.email.eq_ignore_ascii_case(email))
            .map(|r| r.value.clone()))
    }

    async fn list(&self, page: Pagination) -> Result<Page<User>, StoreError> {
        let t = self.table.lock().unwrap();
        let active = t.rows.iter().filter(|r| r.is_active()).map(|r| &r.value).collect();
        Ok(paginate(active, page))
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        let mut t = self.table.lock().unwrap();
        if let Some(email) = &changes.email {
            if t.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let Some(row) = t.active_mut(id) else {
            return Ok(None);
        };
        let user = &mut row.value;
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(hash) = &changes.password_hash {
            user.password_hash = hash.clone();
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.table.lock().unwrap();
        Ok(match t.active_mut(id) {
            Some(row) => {
                row.deleted_at = Some(OffsetDateTime::now_utc());
                true
            }
            None => false,
        })
    }
}

pub async fn seed_user(repo: &InMemoryUsers, name: &str, email: &str) -> User {
    repo.create(NewUser {
        name: name.into(),
        email: email.into(),
        password_hash: hash_password("password1").unwrap(),
    })
    .await
    .unwrap()
}

#[derive(Default)]
struct MovieTable {
    rows: Vec<Row<Movie>>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryMovies {
    table: Mutex<MovieTable>,
}

impl InMemoryMovies {
    /// Total rows including soft-deleted ones.
    pub fn row_count(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }
}

fn matches_filter(filter: &MovieFilter, movie: &Movie) -> bool {
    if filter.is_empty() {
        return true;
    }
    let fields = [
        movie.title.to_lowercase(),
        movie.director.to_lowercase(),
        movie.plot.as_deref().unwrap_or_default().to_lowercase(),
    ];
    filter
        .terms
        .iter()
        .any(|term| fields.iter().any(|f| f.contains(term.as_str())))
}

#[async_trait]
impl MovieRepository for InMemoryMovies {
    async fn create(&self, new: NewMovie) -> Result<Movie, StoreError> {
        let mut t = self.table.lock().unwrap();
        t.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let movie = Movie {
            id: t.next_id,
            title: new.title,
            director: new.director,
            year: new.year,
            plot: new.plot,
            rating: new.rating,
            created_at: now,
            updated_at: now,
        };
        t.rows.push(Row {
            value: movie.clone(),
            deleted_at: None,
        });
        Ok(movie)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Movie>, StoreError> {
        let t = self.table.lock().unwrap();
        Ok(t.rows
            .iter()
            .find(|r| r.is_active() && r.value.id == id)
            .map(|r| r.value.clone()))
    }

    async fn search(&self, filter: &MovieFilter, page: Pagination) -> Result<Page<Movie>, StoreError> {
        let t = self.table.lock().unwrap();
        let matching = t
            .rows
            .iter()
            .filter(|r| r.is_active() && matches_filter(filter, &r.value))
            .map(|r| &r.value)
            .collect();
        Ok(paginate(matching, page))
    }

    async fn update(&self, id: i64, patch: &MoviePatch) -> Result<Option<Movie>, StoreError> {
        let mut t = self.table.lock().unwrap();
        let Some(row) = t.rows.iter_mut().find(|r| r.is_active() && r.value.id == id) else {
            return Ok(None);
        };
        let movie = &mut row.value;
        if let Some(title) = &patch.title {
            movie.title = title.clone();
        }
        if let Some(director) = &patch.director {
            movie.director = director.clone();
        }
        if let Some(year) = patch.year {
            movie.year = year;
        }
        if let Some(plot) = &patch.plot {
            movie.plot = plot.clone();
        }
        if let Some(rating) = patch.rating {
            movie.rating = rating;
        }
        movie.updated_at = OffsetDateTime::now_utc();
        Ok(Some(movie.clone()))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.table.lock().unwrap();
        Ok(
            match t.rows.iter_mut().find(|r| r.is_active() && r.value.id == id) {
                Some(row) => {
                    row.deleted_at = Some(OffsetDateTime::now_utc());
                    true
                }
                None => false,
            },
        )
    }
}
