use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// `?page=&limit=` query parameters, 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}
fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    pub fn validate(self) -> Result<Self, AppError> {
        if self.page < 1 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if (self.page - 1).checked_mul(self.limit).is_none() {
            return Err(AppError::validation("page is out of range"));
        }
        Ok(self)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// One page of rows plus the number of rows matching without paging.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// `ceil(total / limit)`, never less than one.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 1;
    }
    ((total + limit - 1) / limit).max(1)
}
