use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("multipart error: {0}")]
    MultipartError(#[from] actix_multipart::MultipartError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidParam(String),

    #[error("{0}")]
    NotFound(String),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) | Error::MultipartError(_) => StatusCode::BAD_REQUEST,
            Error::InvalidParam(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "detail": self.to_string() }))
    }
}
