pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod search;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new().merge(handlers::movie_routes(state))
}
