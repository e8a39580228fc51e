use axum::{
    extract::State,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
    auth::{claims::AuthUser, middleware::require_auth},
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    pagination::Pagination,
    state::AppState,
    users::{
        dto::{PublicUser, UpdateUserRequest, UserListResponse},
        services,
    },
};

pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
) -> AppResult<Json<UserListResponse>> {
    Ok(Json(services::list_users(state.users.as_ref(), page).await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::get_user(state.users.as_ref(), id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::update_user(state.users.as_ref(), id, payload).await?))
}

#[instrument(skip(state, auth), fields(caller = auth.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    services::delete_user(state.users.as_ref(), &auth, id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
