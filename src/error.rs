use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Storage temporarily unavailable: {0}")]
    Transient(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Event is full")]
    EventFull,
    #[error("Already registered for this event")]
    AlreadyRegistered,
    #[error("Already cancelled")]
    AlreadyCancelled,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

// 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED (plus extended variants)
// 40001 = PostgreSQL serialization failure, 40P01 = deadlock, 55P03 = lock not available
const TRANSIENT_DB_CODES: &[&str] = &["5", "6", "261", "262", "517", "40001", "40P01", "55P03"];

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut => AppError::Transient("connection pool timed out".into()),
            sqlx::Error::Io(io) => AppError::Transient(format!("i/o failure: {}", io)),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if TRANSIENT_DB_CODES.contains(&code.as_ref()) {
                    AppError::Transient(format!("database busy (code {})", code))
                } else {
                    AppError::Database(e)
                }
            }
            _ => AppError::Database(e),
        }
    }
}

impl AppError {
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Transient(_) => "TRANSIENT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::EventFull => "EVENT_FULL",
            AppError::AlreadyRegistered => "ALREADY_REGISTERED",
            AppError::AlreadyCancelled => "ALREADY_CANCELLED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InternalWithMsg(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::InternalWithMsg(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::EventFull
            | AppError::AlreadyRegistered
            | AppError::AlreadyCancelled
            | AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let message = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Transient(msg) => {
                warn!("Transient storage failure: {}", msg);
                "Service temporarily unavailable, please retry".to_string()
            }
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                "Internal error".to_string()
            }
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
