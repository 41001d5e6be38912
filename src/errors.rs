//! Error taxonomy for `postline`.
//!
//! A single `thiserror` enum carries every failure the crate raises. The
//! Credential Store and Token Service errors propagate unchanged; the
//! Repository translates store-native errors into these variants. `Error`
//! implements `IntoResponse`: client-class kinds map to HTTP 400 with their
//! fixed display message, internal-class kinds map to HTTP 500 with a generic
//! message so internal detail never reaches the client. Only `Validation`
//! carries field-level detail to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("request timed out")]
    Timeout,

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    Duplicate,

    #[error("referenced entity does not exist")]
    ForeignKey,

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token creation failed: {0}")]
    TokenCreation(String),

    #[error("hashing failed: {0}")]
    Hashing(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status and the client-facing message for this error. Client-class
    /// kinds expose their display message; internal-class kinds collapse to a
    /// generic 500 so internal detail never leaks.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Error::Timeout
            | Error::Hashing(_)
            | Error::TokenCreation(_)
            | Error::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
            client => (StatusCode::BAD_REQUEST, client.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
