use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::claims::AuthUser;
use crate::error::AppError;

/// Reads the identity `require_auth` stored in the request extensions.
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::MissingAuthHeader)
    }
}
