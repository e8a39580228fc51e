use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{claims::AuthUser, jwt::JwtKeys},
    error::AppError,
    state::AppState,
};

/// Splits `Bearer <token>`; anything else is malformed.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AppError::MissingAuthHeader),
    };
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::MalformedAuthHeader),
    }
}

pub fn authenticate(header: Option<&str>, keys: &JwtKeys) -> Result<AuthUser, AppError> {
    let token = bearer_token(header)?;
    let claims = keys.validate(token)?;
    Ok(claims.into())
}

/// Route layer for everything except register, login and health.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match request.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| AppError::MalformedAuthHeader)?),
    };

    let user = authenticate(header, &state.jwt).map_err(|e| {
        warn!(error = %e, path = %request.uri().path(), "request rejected");
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "s".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn missing_header() {
        assert!(matches!(bearer_token(None), Err(AppError::MissingAuthHeader)));
        assert!(matches!(bearer_token(Some("")), Err(AppError::MissingAuthHeader)));
    }

    #[test]
    fn malformed_header() {
        for header in ["Token abc", "Bearer", "Bearer ", "bearer abc", "Bearer a b", "abc"] {
            assert!(
                matches!(bearer_token(Some(header)), Err(AppError::MalformedAuthHeader)),
                "{header:?} should be malformed"
            );
        }
    }

    #[test]
    fn well_formed_header() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn authenticate_yields_identity() {
        let keys = keys();
        let token = keys.issue(9, "trinity@matrix.io").unwrap();
        let user = authenticate(Some(&format!("Bearer {token}")), &keys).unwrap();
        assert_eq!(
            user,
            AuthUser {
                user_id: 9,
                email: "trinity@matrix.io".into()
            }
        );
    }

    #[test]
    fn authenticate_rejects_bad_token() {
        let err = authenticate(Some("Bearer not-a-jwt"), &keys()).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
