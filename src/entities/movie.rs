use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    /// Insertion sequence; listing follows it.
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub seq: i32,
    #[sea_orm(unique)]
    pub movie_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub overview: String,
    /// Kept exactly as supplied; never parsed as a date.
    pub release_date: String,
    pub vote_average: f64,
    pub poster_path: Option<String>,
    /// Milliseconds since the Unix epoch, assigned on insert.
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
