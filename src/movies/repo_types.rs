use sqlx::FromRow;
use time::OffsetDateTime;

/// Active movie row; soft-deleted rows are never loaded.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub plot: Option<String>,
    pub rating: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub year: i32,
    pub plot: Option<String>,
    pub rating: f64,
}

/// Validated partial update. `None` leaves a column alone; `plot: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub plot: Option<Option<String>>,
    pub rating: Option<f64>,
}
