use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    entities::{genre, movie},
    error::{AppError, AppResult},
    mapper,
};

pub fn router(state: Arc<AppState>) -> Router {
    // The web client calls the collection endpoints with a trailing slash.
    let favorites = get(list_favorites).post(save_favorite);
    let genres = get(list_genres).post(create_genre);
    let movies = Router::new()
        .route("/popular", get(popular))
        .route("/popular/", get(popular))
        .route("/search/{query}", get(search))
        .route("/favorites", favorites.clone())
        .route("/favorites/", favorites)
        .route("/favorites/{movie_id}", get(get_favorite).delete(delete_favorite))
        .route("/genres", genres.clone())
        .route("/genres/", genres)
        .route("/genres/{genre_id}", get(get_genre).delete(delete_genre));

    Router::new()
        .route("/health", get(health))
        .nest("/movies", movies)
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
            ),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn popular(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    Ok(Json(state.tmdb.fetch_popular().await?))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> AppResult<Json<Value>> {
    Ok(Json(state.tmdb.search_movies(&query).await?))
}

async fn save_favorite(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> AppResult<Json<movie::Model>> {
    let movie = mapper::to_stored_movie(&body)?;
    Ok(Json(state.store.create_movie(movie).await?))
}

async fn list_favorites(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<movie::Model>>> {
    let movies = state.store.list_movies().await?;
    if movies.is_empty() {
        return Err(AppError::NotFound("No favorite movies found"));
    }
    Ok(Json(movies))
}

async fn get_favorite(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<movie::Model>> {
    let movie = state.store.get_movie(&movie_id).await?;
    movie.map(Json).ok_or(AppError::NotFound("Movie not found"))
}

async fn delete_favorite(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<Value>> {
    if !state.store.delete_movie(&movie_id).await? {
        return Err(AppError::NotFound("Movie not found"));
    }
    Ok(Json(json!({ "message": "Movie removed from favorites" })))
}

async fn create_genre(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> AppResult<Json<genre::Model>> {
    let genre = mapper::to_stored_genre(&body)?;
    Ok(Json(state.store.create_genre(genre).await?))
}

async fn list_genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<genre::Model>>> {
    Ok(Json(state.store.list_genres().await?))
}

async fn get_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<String>,
) -> AppResult<Json<genre::Model>> {
    let genre = state.store.get_genre(&genre_id).await?;
    genre.map(Json).ok_or(AppError::NotFound("Genre not found"))
}

async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<String>,
) -> AppResult<Json<Value>> {
    if !state.store.delete_genre(&genre_id).await? {
        return Err(AppError::NotFound("Genre not found"));
    }
    Ok(Json(json!({ "message": "Genre removed" })))
}
