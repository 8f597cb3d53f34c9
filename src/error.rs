//! Handler errors and their HTTP responses.
//!
//! Every variant becomes a status code plus a plain-text body carrying the
//! error message. Store messages are passed through unchanged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no profile named {0}")]
    NotFound(String),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Identity(#[from] IdentityError),

    #[error("sign in required")]
    Unauthenticated,

    #[error("no profile registered for {0}")]
    Unregistered(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Unregistered(_) => StatusCode::FORBIDDEN,
            AppError::Decode(_) | AppError::Store(_) | AppError::Identity(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
