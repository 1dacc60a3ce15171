use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("A user with email {0} already exists")]
    EmailTaken(String),

    #[error("Database operation failed")]
    Database(database::Error),

    #[error("Credential handling failed")]
    Credentials(#[from] auth::Error),

    #[error("Failed to bind server address: {0}")]
    ServerBindError(std::io::Error),
}

impl Error {
    /// Shorthand for a field-level validation failure.
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<database::Error> for Error {
    fn from(err: database::Error) -> Self {
        match err {
            database::Error::EmailTaken(email) => Error::EmailTaken(email),
            other => Error::Database(other),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Not authenticated" }),
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Invalid email or password" }),
            ),
            Error::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            Error::Validation { message, field } => {
                let mut body = json!({ "message": message });
                if let Some(field) = field {
                    body["field"] = json!(field);
                }
                (StatusCode::BAD_REQUEST, body)
            }
            Error::EmailTaken(_) => (StatusCode::CONFLICT, json!({ "message": self.to_string() })),
            Error::Database(err) => {
                tracing::error!(error = %err, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
            Error::Credentials(err) => {
                tracing::error!(error = %err, "Credential handling error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
            Error::ServerBindError(err) => {
                tracing::error!(error = %err, "Failed to bind server address");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
