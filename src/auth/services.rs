use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
    },
    db::StoreError,
    error::{AppError, AppResult},
    users::{
        repo::UserRepository,
        repo_types::{NewUser, User},
    },
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases, then checks the shape.
pub(crate) fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    Ok(email)
}

pub(crate) fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn respond(keys: &JwtKeys, user: User) -> AppResult<AuthResponse> {
    let token = keys.issue(user.id, &user.email)?;
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn register(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> AppResult<AuthResponse> {
    let email = normalize_email(&req.email)?;
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    validate_password(&req.password)?;

    if users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password_blocking(req.password).await?;

    // The active-email unique index still catches a concurrent registration.
    let user = users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            other => other.into(),
        })?;

    info!(user_id = user.id, email = %user.email, "user registered");
    respond(keys, user)
}

pub async fn login(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: LoginRequest,
) -> AppResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();

    let user = users.find_by_email(&email).await?;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    // Unknown emails are checked against a dummy hash as well.
    let verified = verify_password_blocking(req.password, stored).await?;

    let user = match user {
        Some(user) if verified => user,
        Some(user) => {
            warn!(user_id = user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            warn!(%email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    info!(user_id = user.id, "user logged in");
    respond(keys, user)
}
