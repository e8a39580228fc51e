use axum::{
    extract::State,
    http::StatusCode,
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
    movies::{
        dto::{
            CreateMovieRequest, MovieListResponse, MovieResponse, SearchMovieResponse,
            SearchQuery, UpdateMovieRequest,
        },
        services,
    },
    pagination::{total_pages, Pagination},
    state::AppState,
};

pub fn movie_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/search", get(search_movies))
        .route(
            "/movies/:id",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
) -> AppResult<Json<MovieListResponse>> {
    let movies = services::list_movies(state.movies.as_ref(), page).await?;
    Ok(Json(MovieListResponse {
        results: movies.items.into_iter().map(MovieResponse::from).collect(),
        count: movies.total,
    }))
}

#[instrument(skip(state))]
pub async fn search_movies(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<SearchQuery>,
) -> AppResult<Json<SearchMovieResponse>> {
    let page = q.pagination();
    let found = services::search_movies(state.movies.as_ref(), &q.query, page).await?;
    Ok(Json(SearchMovieResponse {
        total_pages: total_pages(found.total, page.limit),
        total: found.total,
        data: found.items.into_iter().map(MovieResponse::from).collect(),
        page: page.page,
        limit: page.limit,
    }))
}

#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MovieResponse>> {
    let movie = services::get_movie(state.movies.as_ref(), id).await?;
    Ok(Json(movie.into()))
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn create_movie(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<MovieResponse>)> {
    let movie = services::create_movie(state.movies.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(movie.into())))
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn update_movie(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateMovieRequest>,
) -> AppResult<Json<MovieResponse>> {
    let movie = services::update_movie(state.movies.as_ref(), id, payload).await?;
    Ok(Json(movie.into()))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn delete_movie(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    services::delete_movie(state.movies.as_ref(), id).await?;
    Ok(Json(json!({ "status": "ok" })))
}
