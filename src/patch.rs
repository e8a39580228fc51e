//! Tri-state fields for partial updates.
//!
//! A field declared as `Option<Option<T>>` with
//! `#[serde(default, deserialize_with = "patch::present")]` decodes as:
//! key absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

pub fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Collapses a tri-state field whose column cannot be cleared.
pub fn required<T>(field: &str, value: Option<Option<T>>) -> Result<Option<T>, AppError> {
    match value {
        None => Ok(None),
        Some(Some(v)) => Ok(Some(v)),
        Some(None) => Err(AppError::validation(format!("{field} cannot be null"))),
    }
}
