// HTTP API Error Types
use axum::{response::IntoResponse, http::StatusCode, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        match err {
            crate::database::DatabaseError::ConfigMissing(name) => {
                tracing::error!("Database configuration missing: {}", name);
                ApiError::service_unavailable("Database not configured")
            }
            crate::database::DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Invalid DATABASE_URL");
                ApiError::service_unavailable("Database not configured")
            }
            crate::database::DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::user_service::UserError> for ApiError {
    fn from(err: crate::services::user_service::UserError) -> Self {
        use crate::services::user_service::UserError;
        match err {
            UserError::NotFound => ApiError::not_found("User not found"),
            UserError::EmailTaken(email) => {
                ApiError::conflict(format!("An account already exists for '{}'", email))
            }
            UserError::InvalidStoredRole(role) => {
                tracing::error!("User row carries unknown role '{}'", role);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hashing failed: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            UserError::Database(sqlx_err) => {
                tracing::error!("User query error: {}", sqlx_err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::services::board_service::BoardError> for ApiError {
    fn from(err: crate::services::board_service::BoardError) -> Self {
        use crate::services::board_service::BoardError;
        match err {
            BoardError::NotFound => ApiError::not_found("Board not found"),
            BoardError::CardNotFound => ApiError::not_found("Card not found"),
            BoardError::ColumnNotFound => ApiError::not_found("Column not found"),
            BoardError::PermissionDenied => {
                ApiError::forbidden("You do not have permission to perform this action on the board")
            }
            BoardError::MemberExists => ApiError::conflict("User is already a member of this board"),
            BoardError::UserNotFound => ApiError::not_found("User not found"),
            BoardError::MemberNotFound => ApiError::not_found("Board member not found"),
            BoardError::InvalidColumnSet => {
                ApiError::bad_request("Column list must contain every column of the board exactly once")
            }
            BoardError::InvalidStoredRole(role) => {
                tracing::error!("Membership row carries unknown role '{}'", role);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            BoardError::Database(sqlx_err) => {
                tracing::error!("Board query error: {}", sqlx_err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::auth::token::TokenError> for ApiError {
    fn from(err: crate::auth::token::TokenError) -> Self {
        use crate::auth::token::TokenError;
        match err {
            // Sign-side failures are server misconfiguration, not client faults
            TokenError::MissingSecret => {
                tracing::error!("SESSION_SECRET is not configured; cannot sign session tokens");
                ApiError::internal_server_error("Session signing unavailable")
            }
            TokenError::Generation(msg) => {
                tracing::error!("Session token generation failed: {}", msg);
                ApiError::internal_server_error("Session signing unavailable")
            }
            // Verify-side failures only surface when a caller verifies directly;
            // the session resolver downgrades them to Unauthenticated instead.
            TokenError::Expired => ApiError::unauthorized("Session expired"),
            TokenError::SignatureInvalid => ApiError::unauthorized("Invalid session token"),
            TokenError::Malformed(_) => ApiError::unauthorized("Invalid session token"),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
