use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned by every failing endpoint:
/// `{ "error": { "code": ..., "description": ... } }`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": {
        "code": "NOT_FOUND_ERROR",
        "description": "Order not found"
    }
}))]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code
    #[schema(example = "NOT_FOUND_ERROR")]
    pub code: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Order not found")]
    pub description: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, description: Option<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                description,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid VPA: {0}")]
    InvalidVpa(String),

    #[error("Invalid card: {0}")]
    InvalidCard(String),

    #[error("Expired card: {0}")]
    ExpiredCard(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Returns the HTTP status for this error. Single source of truth for
    /// error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::BadRequest(_)
            | Self::InvalidVpa(_)
            | Self::InvalidCard(_)
            | Self::ExpiredCard(_) => StatusCode::BAD_REQUEST,
            Self::AuthError(_) => StatusCode::UNAUTHORIZED,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code carried in the response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND_ERROR",
            Self::ValidationError(_) | Self::BadRequest(_) => "BAD_REQUEST_ERROR",
            Self::AuthError(_) => "AUTHENTICATION_ERROR",
            Self::InvalidVpa(_) => "INVALID_VPA",
            Self::InvalidCard(_) => "INVALID_CARD",
            Self::ExpiredCard(_) => "EXPIRED_CARD",
            Self::DatabaseError(_) | Self::InternalError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Description carried in the response body. Internal errors return no
    /// description to avoid leaking implementation details.
    pub fn response_description(&self) -> Option<String> {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => None,
            Self::NotFound(msg)
            | Self::ValidationError(msg)
            | Self::BadRequest(msg)
            | Self::AuthError(msg)
            | Self::InvalidVpa(msg)
            | Self::InvalidCard(msg)
            | Self::ExpiredCard(msg) => Some(msg.clone()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse::new(self.error_code(), self.response_description());
        (status, Json(body)).into_response()
    }
}
