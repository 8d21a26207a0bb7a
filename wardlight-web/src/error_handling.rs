use axum::{
    extract::Request,
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] wardlight_core::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    pub timestamp: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: String, code: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message,
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: HashMap<String, serde_json::Value>) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use wardlight_core::Error as LedgerError;

        let (status, error_response) = match self {
            AppError::Ledger(LedgerError::InvalidPriority(priority)) => {
                warn!("Rejected priority {}", priority);
                let mut details = HashMap::new();
                details.insert("priority".to_string(), serde_json::json!(priority));
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "invalid_priority",
                        format!("Priority {} is not one of 1, 2, 3", priority),
                        "INVALID_PRIORITY",
                    )
                    .with_details(details),
                )
            }

            AppError::Ledger(LedgerError::StoreUnavailable(ref e)) => {
                error!("Store unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new(
                        "store_unavailable",
                        "The database is currently unavailable".to_string(),
                        "STORE_UNAVAILABLE",
                    ),
                )
            }

            AppError::Ledger(LedgerError::StoreIo(ref e)) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "database_error",
                        "A database error occurred".to_string(),
                        "DB_ERROR",
                    ),
                )
            }

            AppError::Validation(ref err) => {
                let message = err.to_message();
                warn!("Validation error: {}", message);
                (
                    err.to_status_code(),
                    ErrorResponse::new("validation_error", message, "VALIDATION_FAILED"),
                )
            }

            AppError::NotFound { ref resource } => {
                warn!("Resource not found: {}", resource);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(
                        "not_found",
                        format!("Resource not found: {}", resource),
                        "NOT_FOUND",
                    ),
                )
            }

            AppError::BadRequest { ref message } => {
                warn!("Bad request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("bad_request", message.clone(), "BAD_REQUEST"),
                )
            }

            AppError::Template(ref e) => {
                error!("Template rendering failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "internal_error",
                        "An internal error occurred".to_string(),
                        "TEMPLATE_ERROR",
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Helper functions for creating specific errors
impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

// 404 handler
pub async fn handle_404(uri: Uri) -> impl IntoResponse {
    let error_response = ErrorResponse::new(
        "not_found",
        format!("No route found for {}", uri.path()),
        "ROUTE_NOT_FOUND",
    );

    (StatusCode::NOT_FOUND, Json(error_response))
}

// Health check types and functions
#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub services: HashMap<String, ServiceHealth>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceHealth {
    pub status: String,
    pub response_time_ms: Option<f64>,
    pub error: Option<String>,
    pub last_check: String,
}

pub async fn check_database_health(pool: &sqlx::Pool<sqlx::Sqlite>) -> ServiceHealth {
    let start = std::time::Instant::now();

    let (status, error) = match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => ("healthy", None),
        Err(e) => ("unhealthy", Some(e.to_string())),
    };

    ServiceHealth {
        status: status.to_string(),
        response_time_ms: Some(start.elapsed().as_millis() as f64),
        error,
        last_check: chrono::Utc::now().to_rfc3339(),
    }
}

// Middleware for request tracing
pub async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let trace_id = uuid::Uuid::new_v4().to_string();
    tracing::debug!(
        trace_id = %trace_id,
        method = %method,
        uri = %uri,
        "Request started"
    );

    let response = next.run(request).await;

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
