use std::ops::RangeInclusive;

use tracing::info;

use crate::{
    error::{AppError, AppResult},
    movies::{
        dto::{CreateMovieRequest, UpdateMovieRequest},
        repo::MovieRepository,
        repo_types::{Movie, MoviePatch, NewMovie},
        search::MovieFilter,
    },
    pagination::{Page, Pagination},
    patch,
};

pub const YEAR_RANGE: RangeInclusive<i32> = 1800..=2100;
pub const RATING_RANGE: RangeInclusive<f64> = 0.0..=10.0;

fn check_year(year: i32) -> AppResult<i32> {
    if !YEAR_RANGE.contains(&year) {
        return Err(AppError::validation(format!(
            "year must be between {} and {}",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        )));
    }
    Ok(year)
}

fn check_rating(rating: f64) -> AppResult<f64> {
    // NaN fails `contains` as well.
    if !RATING_RANGE.contains(&rating) {
        return Err(AppError::validation(format!(
            "rating must be between {} and {}",
            RATING_RANGE.start(),
            RATING_RANGE.end()
        )));
    }
    Ok(rating)
}

fn check_text(field: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn required<T>(field: &str, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| AppError::validation(format!("{field} is required")))
}

impl TryFrom<CreateMovieRequest> for NewMovie {
    type Error = AppError;

    fn try_from(req: CreateMovieRequest) -> AppResult<Self> {
        Ok(Self {
            title: check_text("title", required("title", req.title)?)?,
            director: check_text("director", required("director", req.director)?)?,
            year: check_year(required("year", req.year)?)?,
            plot: req.plot,
            rating: check_rating(req.rating.unwrap_or(0.0))?,
        })
    }
}

impl TryFrom<UpdateMovieRequest> for MoviePatch {
    type Error = AppError;

    fn try_from(req: UpdateMovieRequest) -> AppResult<Self> {
        Ok(Self {
            title: patch::required("title", req.title)?
                .map(|t| check_text("title", t))
                .transpose()?,
            director: patch::required("director", req.director)?
                .map(|d| check_text("director", d))
                .transpose()?,
            year: patch::required("year", req.year)?.map(check_year).transpose()?,
            plot: req.plot,
            rating: patch::required("rating", req.rating)?
                .map(check_rating)
                .transpose()?,
        })
    }
}

pub async fn create_movie(repo: &dyn MovieRepository, req: CreateMovieRequest) -> AppResult<Movie> {
    let new = NewMovie::try_from(req)?;
    let movie = repo.create(new).await?;
    info!(movie_id = movie.id, "movie created");
    Ok(movie)
}

pub async fn get_movie(repo: &dyn MovieRepository, id: i64) -> AppResult<Movie> {
    repo.find_by_id(id).await?.ok_or(AppError::NotFound("Movie"))
}

pub async fn update_movie(
    repo: &dyn MovieRepository,
    id: i64,
    req: UpdateMovieRequest,
) -> AppResult<Movie> {
    let patch = MoviePatch::try_from(req)?;
    let movie = repo
        .update(id, &patch)
        .await?
        .ok_or(AppError::NotFound("Movie"))?;
    info!(movie_id = id, "movie updated");
    Ok(movie)
}

pub async fn delete_movie(repo: &dyn MovieRepository, id: i64) -> AppResult<()> {
    if !repo.soft_delete(id).await? {
        return Err(AppError::NotFound("Movie"));
    }
    info!(movie_id = id, "movie deleted");
    Ok(())
}

pub async fn list_movies(repo: &dyn MovieRepository, page: Pagination) -> AppResult<Page<Movie>> {
    let page = page.validate()?;
    Ok(repo.search(&MovieFilter::default(), page).await?)
}

pub async fn search_movies(
    repo: &dyn MovieRepository,
    query: &str,
    page: Pagination,
) -> AppResult<Page<Movie>> {
    let page = page.validate()?;
    let filter = MovieFilter::from_query(query);
    Ok(repo.search(&filter, page).await?)
}
