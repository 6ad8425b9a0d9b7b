// src/service/error.rs
use serde::Serialize;
use thiserror::Error;

use crate::error::{ErrorMessage, HttpError};

/// One entry per failing field, so callers and tests can inspect which
/// field produced which message instead of matching on an opaque string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum TicketError {
    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<TicketError> for HttpError {
    fn from(error: TicketError) -> Self {
        match error {
            TicketError::MissingInput(_) => HttpError::bad_request(error.to_string()),

            TicketError::NotFound(_) => HttpError::not_found(error.to_string()),

            TicketError::InvalidCredential(_) => HttpError::unauthorized(error.to_string()),

            TicketError::InvalidState(_) => HttpError::conflict(error.to_string()),

            TicketError::Validation(fields) => HttpError::unprocessable_entity(
                fields.into_iter().map(|f| f.message).collect(),
            ),

            TicketError::Database(err) => {
                tracing::error!("Database error: {err}");
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        let cases = [
            (
                TicketError::MissingInput("The ticket id is required.".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                TicketError::NotFound("No ticket exists with that id.".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                TicketError::InvalidCredential("The secret key is not valid.".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                TicketError::InvalidState("That ticket has already been closed.".into()),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            let message = err.to_string();
            let http: HttpError = err.into();
            assert_eq!(http.status, status);
            assert_eq!(http.messages, vec![message]);
        }
    }

    #[test]
    fn validation_flattens_to_per_field_messages() {
        let err = TicketError::Validation(vec![
            FieldError {
                field: "username".into(),
                message: "Username is required".into(),
            },
            FieldError {
                field: "email".into(),
                message: "Email is invalid".into(),
            },
        ]);

        let http: HttpError = err.into();
        assert_eq!(http.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            http.messages,
            vec!["Username is required".to_string(), "Email is invalid".to_string()]
        );
    }
}
