use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;

use crate::mapper::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to connect to database: {0}")]
    Connection(#[source] DbErr),

    #[error("database connection manager is not initialized")]
    NotInitialized,

    #[error("failed to provision database `{database}`: {source}")]
    Provisioning {
        database: String,
        #[source]
        source: DbErr,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} `{id}` already exists")]
    DuplicateKey { entity: &'static str, id: String },

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateKey { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::Connection(_) | AppError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Provisioning { .. } | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        }
        let body = json!({ "status": "error", "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
