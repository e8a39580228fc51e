use tracing::{info, warn};

use crate::{
    auth::{
        claims::AuthUser,
        password::hash_password_blocking,
        services::{normalize_email, validate_password},
    },
    error::{AppError, AppResult},
    pagination::Pagination,
    patch,
    users::{
        dto::{PublicUser, UpdateUserRequest, UserListResponse},
        repo::UserRepository,
        repo_types::UserChanges,
    },
};

pub async fn list_users(repo: &dyn UserRepository, page: Pagination) -> AppResult<UserListResponse> {
    let page = page.validate()?;
    let users = repo.list(page).await?;
    Ok(UserListResponse {
        data: users.items.into_iter().map(PublicUser::from).collect(),
        total: users.total,
    })
}

pub async fn get_user(repo: &dyn UserRepository, id: i64) -> AppResult<PublicUser> {
    repo.find_by_id(id)
        .await?
        .map(PublicUser::from)
        .ok_or(AppError::NotFound("User"))
}

pub async fn update_user(
    repo: &dyn UserRepository,
    id: i64,
    req: UpdateUserRequest,
) -> AppResult<PublicUser> {
    let existing = repo.find_by_id(id).await?.ok_or(AppError::NotFound("User"))?;

    let mut changes = UserChanges::default();

    if let Some(name) = patch::required("name", req.name)? {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name must not be empty"));
        }
        changes.name = Some(name.to_string());
    }

    if let Some(email) = patch::required("email", req.email)? {
        let email = normalize_email(&email)?;
        if email != existing.email {
            if let Some(other) = repo.find_by_email(&email).await? {
                if other.id != id {
                    warn!(user_id = id, "email already in use");
                    return Err(AppError::DuplicateEmail);
                }
            }
            changes.email = Some(email);
        }
    }

    if let Some(password) = patch::required("password", req.password)? {
        validate_password(&password)?;
        changes.password_hash = Some(hash_password_blocking(password).await?);
    }

    let user = repo
        .update(id, &changes)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = id, "user updated");
    Ok(user.into())
}

pub async fn delete_user(repo: &dyn UserRepository, current: &AuthUser, id: i64) -> AppResult<()> {
    if current.user_id == id {
        return Err(AppError::CannotDeleteSelf);
    }
    if !repo.soft_delete(id).await? {
        return Err(AppError::NotFound("User"));
    }
    info!(user_id = id, deleted_by = current.user_id, "user deleted");
    Ok(())
}
