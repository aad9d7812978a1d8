//! Conversion from untyped wire data to the shapes stored in `movies` and
//! `genres`. Values pass through untouched: no date parsing, no rounding.

use std::fmt;

use sea_orm::{NotSet, Set};
use serde_json::{Map, Value};

use crate::entities::{genre, movie};

#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub movie_id: String,
    pub title: String,
    pub overview: String,
    pub release_date: String,
    pub vote_average: f64,
    pub poster_path: Option<String>,
}

impl NewMovie {
    pub fn into_active_model(self, created_at: i64) -> movie::ActiveModel {
        movie::ActiveModel {
            seq: NotSet,
            movie_id: Set(self.movie_id),
            title: Set(self.title),
            overview: Set(self.overview),
            release_date: Set(self.release_date),
            vote_average: Set(self.vote_average),
            poster_path: Set(self.poster_path),
            created_at: Set(created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGenre {
    pub genre_id: String,
    pub name: String,
}

impl NewGenre {
    pub fn into_active_model(self, created_at: i64) -> genre::ActiveModel {
        genre::ActiveModel {
            seq: NotSet,
            genre_id: Set(self.genre_id),
            name: Set(self.name),
            created_at: Set(created_at),
        }
    }
}

/// Every required field that was absent (or null), plus every field present
/// with the wrong JSON type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
    pub invalid: Vec<&'static str>,
}

impl ValidationError {
    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing required fields: {}", self.missing.join(", ")));
        }
        if !self.invalid.is_empty() {
            parts.push(format!("fields with invalid type: {}", self.invalid.join(", ")));
        }
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

pub fn to_stored_movie(external: &Value) -> Result<NewMovie, ValidationError> {
    let mut fields = Fields::new(external);

    let movie_id = fields.id("movie_id");
    let title = fields.text("title");
    let overview = fields.text("overview");
    let release_date = fields.text("release_date");
    let vote_average = fields.number("vote_average");
    let poster_path = fields.optional_text("poster_path");

    match (movie_id, title, overview, release_date, vote_average) {
        (Some(movie_id), Some(title), Some(overview), Some(release_date), Some(vote_average))
            if fields.errors.is_empty() =>
        {
            Ok(NewMovie { movie_id, title, overview, release_date, vote_average, poster_path })
        },
        _ => Err(fields.errors),
    }
}

pub fn to_stored_genre(external: &Value) -> Result<NewGenre, ValidationError> {
    let mut fields = Fields::new(external);

    let genre_id = fields.id("genre_id");
    let name = fields.text("name");

    match (genre_id, name) {
        (Some(genre_id), Some(name)) if fields.errors.is_empty() => Ok(NewGenre { genre_id, name }),
        _ => Err(fields.errors),
    }
}

struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: ValidationError,
}

impl<'a> Fields<'a> {
    fn new(external: &'a Value) -> Self {
        Self { object: external.as_object(), errors: ValidationError::default() }
    }

    fn lookup(&self, key: &str) -> Option<&'a Value> {
        self.object.and_then(|o| o.get(key)).filter(|v| !v.is_null())
    }

    fn required(&mut self, key: &'static str) -> Option<&'a Value> {
        let value = self.lookup(key);
        if value.is_none() {
            self.errors.missing.push(key);
        }
        value
    }

    fn text(&mut self, key: &'static str) -> Option<String> {
        match self.required(key)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.errors.invalid.push(key);
                None
            },
        }
    }

    // Upstream ids are integers; stored ids are strings.
    fn id(&mut self, key: &'static str) -> Option<String> {
        match self.required(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => {
                self.errors.invalid.push(key);
                None
            },
        }
    }

    fn number(&mut self, key: &'static str) -> Option<f64> {
        let value = self.required(key)?;
        let number = value.as_f64();
        if number.is_none() {
            self.errors.invalid.push(key);
        }
        number
    }

    fn optional_text(&mut self, key: &'static str) -> Option<String> {
        match self.lookup(key)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.errors.invalid.push(key);
                None
            },
        }
    }
}
