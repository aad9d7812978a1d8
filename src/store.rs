use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};
use tracing::{debug, warn};

use crate::{
    db::ConnectionManager,
    entities::{genre, movie},
    error::{AppError, AppResult},
    mapper::{NewGenre, NewMovie},
};

/// Favorite movies and genres. Every write runs in its own transaction; reads
/// use the session directly. Listings follow the `seq` column, which the
/// database assigns on insert.
#[derive(Clone)]
pub struct FavoritesStore {
    db: Arc<ConnectionManager>,
}

impl FavoritesStore {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }

    pub async fn create_movie(&self, movie: NewMovie) -> AppResult<movie::Model> {
        let session = self.db.acquire_session().await?;
        let movie_id = movie.movie_id.clone();

        let txn = session.begin().await?;
        let inserted = movie.into_active_model(now_millis()).insert(&txn).await;
        let model = commit_or_rollback(txn, inserted)
            .await
            .map_err(|err| duplicate_or(err, "movie", movie_id))?;

        debug!(movie_id = %model.movie_id, title = %model.title, "favorite movie created");
        Ok(model)
    }

    pub async fn get_movie(&self, movie_id: &str) -> AppResult<Option<movie::Model>> {
        let session = self.db.acquire_session().await?;
        let found = movie::Entity::find()
            .filter(movie::Column::MovieId.eq(movie_id))
            .one(session.conn())
            .await?;
        Ok(found)
    }

    pub async fn list_movies(&self) -> AppResult<Vec<movie::Model>> {
        let session = self.db.acquire_session().await?;
        let movies = movie::Entity::find()
            .order_by_asc(movie::Column::Seq)
            .all(session.conn())
            .await?;
        Ok(movies)
    }

    pub async fn delete_movie(&self, movie_id: &str) -> AppResult<bool> {
        let session = self.db.acquire_session().await?;

        let txn = session.begin().await?;
        let deleted = movie::Entity::delete_many()
            .filter(movie::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await;
        let deleted = commit_or_rollback(txn, deleted).await?.rows_affected > 0;

        debug!(movie_id = %movie_id, deleted, "favorite movie delete");
        Ok(deleted)
    }

    pub async fn create_genre(&self, genre: NewGenre) -> AppResult<genre::Model> {
        let session = self.db.acquire_session().await?;
        let genre_id = genre.genre_id.clone();

        let txn = session.begin().await?;
        let inserted = genre.into_active_model(now_millis()).insert(&txn).await;
        let model = commit_or_rollback(txn, inserted)
            .await
            .map_err(|err| duplicate_or(err, "genre", genre_id))?;

        debug!(genre_id = %model.genre_id, name = %model.name, "genre created");
        Ok(model)
    }

    pub async fn get_genre(&self, genre_id: &str) -> AppResult<Option<genre::Model>> {
        let session = self.db.acquire_session().await?;
        let found = genre::Entity::find()
            .filter(genre::Column::GenreId.eq(genre_id))
            .one(session.conn())
            .await?;
        Ok(found)
    }

    pub async fn list_genres(&self) -> AppResult<Vec<genre::Model>> {
        let session = self.db.acquire_session().await?;
        let genres = genre::Entity::find()
            .order_by_asc(genre::Column::Seq)
            .all(session.conn())
            .await?;
        Ok(genres)
    }

    pub async fn delete_genre(&self, genre_id: &str) -> AppResult<bool> {
        let session = self.db.acquire_session().await?;

        let txn = session.begin().await?;
        let deleted = genre::Entity::delete_many()
            .filter(genre::Column::GenreId.eq(genre_id))
            .exec(&txn)
            .await;
        let deleted = commit_or_rollback(txn, deleted).await?.rows_affected > 0;

        debug!(genre_id = %genre_id, deleted, "genre delete");
        Ok(deleted)
    }
}

/// Commits on success. On failure rolls back and hands back the original
/// error; a failed rollback is only logged.
async fn commit_or_rollback<T>(
    txn: DatabaseTransaction,
    result: Result<T, DbErr>,
) -> Result<T, DbErr> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        },
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        },
    }
}

fn duplicate_or(err: DbErr, entity: &'static str, id: String) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateKey { entity, id },
        _ => err.into(),
    }
}

fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}
