use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    movies::repo_types::Movie,
    pagination::{self, Pagination},
    patch,
};

/// Request body for `POST /movies`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub rating: Option<f64>,
}

/// Request body for `PUT /movies/:id`; only the keys present are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMovieRequest {
    #[serde(default, deserialize_with = "patch::present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::present")]
    pub director: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::present")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "patch::present")]
    pub plot: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::present")]
    pub rating: Option<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieResponse {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    pub rating: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Movie> for MovieResponse {
    fn from(m: Movie) -> Self {
        Self {
            id: m.id,
            title: m.title,
            director: m.director,
            year: m.year,
            plot: m.plot,
            rating: m.rating,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub results: Vec<MovieResponse>,
    pub count: i64,
}

/// `?query=&page=&limit=`; kept flat because `serde(flatten)` breaks numeric query params.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    pagination::DEFAULT_PAGE
}
fn default_limit() -> i64 {
    pagination::DEFAULT_LIMIT
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchMovieResponse {
    pub data: Vec<MovieResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}
