use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorMessage {
    ServerError,
    TokenNotProvided,
    InvalidToken,
    UserNoLongerExist,
    UserNotAuthenticated,
    PermissionDenied,
}

impl ToString for ErrorMessage {
    fn to_string(&self) -> String {
        self.to_str().to_owned()
    }
}

impl ErrorMessage {
    fn to_str(&self) -> &str {
        match self {
            ErrorMessage::ServerError => "Server error. Please try again later",
            ErrorMessage::TokenNotProvided => "You are not logged in, please provide a token",
            ErrorMessage::InvalidToken => "Authentication token is invalid or expired",
            ErrorMessage::UserNoLongerExist => "User belonging to this token no longer exists",
            ErrorMessage::UserNotAuthenticated => "Authentication required. Please log in.",
            ErrorMessage::PermissionDenied => "You are not allowed to perform this action",
        }
    }
}

/// Uniform failure value returned by every route. The body keeps the
/// `{"fail": true, "message": ...}` shape the clients already consume;
/// `message` collapses to a bare string unless several messages are carried
/// (field validation).
#[derive(Debug, Clone)]
pub struct HttpError {
    pub messages: Vec<String>,
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            messages: vec![message.into()],
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::UNAUTHORIZED)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::NOT_FOUND)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::CONFLICT)
    }

    pub fn unprocessable_entity(messages: Vec<String>) -> Self {
        HttpError {
            messages,
            status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.messages.join("; "),
            self.status
        )
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = match self.messages.as_slice() {
            [single] => json!({
                "fail": true,
                "message": single,
            }),
            many => json!({
                "fail": true,
                "message": many,
            }),
        };

        (self.status, Json(body)).into_response()
    }
}
