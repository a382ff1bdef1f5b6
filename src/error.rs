use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// The connection pool could not hand out a client.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The connection pool could not be built.
    #[error("Pool build error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The session could not be loaded, rotated or saved.
    #[error("Session error: {0}")]
    Session(String),

    /// The record is absent or has expired.
    #[error("Resource not found")]
    NotFound,

    /// The email address is already registered.
    #[error("Duplicate email")]
    DuplicateEmail,

    /// Unknown email or wrong password. The two cases are never told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request body or query could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The CSRF token was missing or did not match.
    #[error("CSRF verification failed: {0}")]
    Csrf(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }

            AppError::CreatePool(ref e) => {
                tracing::error!("Pool build error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }

            AppError::Session(ref msg) => {
                tracing::error!("Session error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                StatusCode::NOT_FOUND
            }

            AppError::DuplicateEmail => {
                tracing::debug!("Duplicate email");
                StatusCode::UNPROCESSABLE_ENTITY
            }

            AppError::InvalidCredentials => {
                tracing::debug!("Invalid credentials");
                StatusCode::UNPROCESSABLE_ENTITY
            }

            AppError::BadRequest(ref msg) => {
                tracing::debug!("Bad request: {}", msg);
                StatusCode::BAD_REQUEST
            }

            AppError::Csrf(ref msg) => {
                tracing::warn!("CSRF verification failed: {}", msg);
                StatusCode::BAD_REQUEST
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = status
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_string();

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_codes() {
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DuplicateEmail.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::BadRequest("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn server_errors_hide_detail() {
        let response = AppError::Internal("secret detail".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert_eq!(text, "Internal Server Error");
        assert!(!text.contains("secret"));
    }
}
