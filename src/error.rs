use rocket::{
    Request,
    http::Status,
    response::{self, Responder},
    serde::json::Json,
};
use thiserror::Error;

use crate::model::server::ErrorResponse;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("expected {expected} mines, got {actual}")]
    MineCount { expected: usize, actual: usize },
    #[error("mine at ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("mine at ({row}, {col}) listed twice")]
    Duplicate { row: usize, col: usize },
}

/// Errors surfaced to HTTP clients as `{"error": "..."}` bodies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Session not found")]
    NotFound,
    #[error("Too many new games, slow down")]
    RateLimited,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::BadRequest(_) => Status::BadRequest,
            Self::NotFound => Status::NotFound,
            Self::RateLimited => Status::TooManyRequests,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).respond_to(request)
    }
}
