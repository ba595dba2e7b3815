use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::reader::ReaderError;
use crate::source::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upstream error: {0}")]
    Upstream(#[from] SourceError),
}

impl From<ReaderError> for AppError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::NotInCatalog(path) => AppError::NotFound(path),
            ReaderError::Source(e) => AppError::Upstream(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}
