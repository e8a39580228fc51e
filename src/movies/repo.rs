use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    db::{self, StoreError},
    movies::{
        repo_types::{Movie, MoviePatch, NewMovie},
        search::MovieFilter,
    },
    pagination::{Page, Pagination},
};

const MOVIE_COLUMNS: &str = "id, title, director, year, plot, rating, created_at, updated_at";

/// Movie persistence. Reads never return soft-deleted rows.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn create(&self, new: NewMovie) -> Result<Movie, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Movie>, StoreError>;
    /// Rows ordered by id, plus the count of every row the filter matches.
    async fn search(&self, filter: &MovieFilter, page: Pagination) -> Result<Page<Movie>, StoreError>;
    /// Applies only the fields present in `patch`, in one statement.
    async fn update(&self, id: i64, patch: &MoviePatch) -> Result<Option<Movie>, StoreError>;
    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgMovieRepository {
    db: PgPool,
}

impl PgMovieRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn create(&self, new: NewMovie) -> Result<Movie, StoreError> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            r#"
            INSERT INTO movies (title, director, year, plot, rating)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MOVIE_COLUMNS}
            "#
        ))
        .bind(new.title)
        .bind(new.director)
        .bind(new.year)
        .bind(new.plot)
        .bind(new.rating)
        .fetch_one(&self.db)
        .await?;
        Ok(movie)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Movie>, StoreError> {
        let mut qb = db::active(&format!("SELECT {MOVIE_COLUMNS} FROM movies"));
        qb.push(" AND id = ").push_bind(id);
        Ok(qb.build_query_as::<Movie>().fetch_optional(&self.db).await?)
    }

    async fn search(&self, filter: &MovieFilter, page: Pagination) -> Result<Page<Movie>, StoreError> {
        let mut count = db::active("SELECT COUNT(*) FROM movies");
        filter.push_predicate(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb = db::active(&format!("SELECT {MOVIE_COLUMNS} FROM movies"));
        filter.push_predicate(&mut qb);
        qb.push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = qb.build_query_as::<Movie>().fetch_all(&self.db).await?;

        Ok(Page { items, total })
    }

    async fn update(&self, id: i64, patch: &MoviePatch) -> Result<Option<Movie>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE movies SET updated_at = now()");
        if let Some(title) = &patch.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(director) = &patch.director {
            qb.push(", director = ").push_bind(director.clone());
        }
        if let Some(year) = patch.year {
            qb.push(", year = ").push_bind(year);
        }
        if let Some(plot) = &patch.plot {
            qb.push(", plot = ").push_bind(plot.clone());
        }
        if let Some(rating) = patch.rating {
            qb.push(", rating = ").push_bind(rating);
        }
        db::push_active(&mut qb);
        qb.push(" AND id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(MOVIE_COLUMNS);

        Ok(qb.build_query_as::<Movie>().fetch_optional(&self.db).await?)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("UPDATE movies SET deleted_at = now(), updated_at = now()");
        db::push_active(&mut qb);
        qb.push(" AND id = ").push_bind(id);
        let res = qb.build().execute(&self.db).await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    fn new_movie(title: &str, director: &str, plot: Option<&str>) -> NewMovie {
        NewMovie {
            title: title.into(),
            director: director.into(),
            year: 2000,
            plot: plot.map(Into::into),
            rating: 0.0,
        }
    }

    fn ids(page: &Page<Movie>) -> Vec<i64> {
        page.items.iter().map(|m| m.id).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn search_ors_terms_across_title_director_and_plot(pool: PgPool) {
        let repo = PgMovieRepository::new(pool);
        let knight = repo
            .create(new_movie("The Dark Knight", "Christopher Nolan", None))
            .await
            .unwrap();
        let heat = repo
            .create(new_movie("Heat", "Michael Mann", Some("A knightly cop hunts a crew.")))
            .await
            .unwrap();
        repo.create(new_movie("Amelie", "Jeunet", None)).await.unwrap();

        let found = repo
            .search(&MovieFilter::from_query("dark knight"), Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![knight.id, heat.id]);
        assert_eq!(found.total, 2);

        let by_director = repo
            .search(&MovieFilter::from_query("NOLAN"), Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&by_director), vec![knight.id]);

        let first = repo
            .search(&MovieFilter::from_query("knight"), Pagination::new(1, 1))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec![knight.id]);
        assert_eq!(first.total, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn search_treats_like_wildcards_literally(pool: PgPool) {
        let repo = PgMovieRepository::new(pool);
        let literal = repo.create(new_movie("snake_case", "X", None)).await.unwrap();
        repo.create(new_movie("snakeXcase", "X", None)).await.unwrap();

        let found = repo
            .search(&MovieFilter::from_query("snake_case"), Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![literal.id]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_touches_only_present_fields(pool: PgPool) {
        let repo = PgMovieRepository::new(pool);
        let movie = repo
            .create(new_movie("A", "D", Some("A plot.")))
            .await
            .unwrap();

        let patch = MoviePatch {
            year: Some(2001),
            ..Default::default()
        };
        let updated = repo.update(movie.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "A");
        assert_eq!(updated.year, 2001);
        assert_eq!(updated.plot.as_deref(), Some("A plot."));
        assert!(updated.updated_at >= movie.updated_at);

        let clear = MoviePatch {
            plot: Some(None),
            ..Default::default()
        };
        let cleared = repo.update(movie.id, &clear).await.unwrap().unwrap();
        assert_eq!(cleared.plot, None);
        assert_eq!(cleared.year, 2001);

        assert!(repo.update(movie.id + 1000, &patch).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn soft_deleted_rows_are_invisible(pool: PgPool) {
        let repo = PgMovieRepository::new(pool.clone());
        let kept = repo.create(new_movie("Kept", "X", None)).await.unwrap();
        let gone = repo.create(new_movie("Gone", "X", None)).await.unwrap();

        assert!(repo.soft_delete(gone.id).await.unwrap());
        assert!(!repo.soft_delete(gone.id).await.unwrap());

        assert!(repo.find_by_id(gone.id).await.unwrap().is_none());
        let patch = MoviePatch {
            title: Some("Back".into()),
            ..Default::default()
        };
        assert!(repo.update(gone.id, &patch).await.unwrap().is_none());

        let listed = repo
            .search(&MovieFilter::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&listed), vec![kept.id]);
        assert_eq!(listed.total, 1);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 2);
    }
}
