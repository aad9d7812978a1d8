pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod mapper;
pub mod routes;
pub mod store;
pub mod tmdb;

use std::sync::Arc;

use crate::{store::FavoritesStore, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub store: FavoritesStore,
    pub tmdb: Arc<TmdbClient>,
}
