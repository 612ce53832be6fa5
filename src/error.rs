use crate::validation::{FieldViolation, ValidationReport};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use thiserror::Error;

/// Failures reported by an `ArticleStore`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("article not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[source] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("blocking task canceled")]
    Canceled,
}

impl From<diesel::result::Error> for StoreError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => StoreError::NotFound,
            e => StoreError::Database(e),
        }
    }
}

/// Everything a handler can fail with. `Display` is the message sent to the
/// client, so storage details never leave the process.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request body is empty")]
    EmptyBody,
    #[error("Article list is empty")]
    EmptyBatch,
    #[error("Invalid JSON format")]
    MalformedPayload(#[source] serde_json::Error),
    #[error("{0}")]
    ValidationFailed(ValidationReport),
    #[error("Invalid path parameter '{name}': {value}")]
    InvalidPathParameter { name: &'static str, value: String },
    #[error("Article not found")]
    NotFound,
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wraps a store failure under a client-facing `context` message. A row
    /// that disappeared between read and write is still a 404.
    pub fn storage(context: &'static str, source: StoreError) -> Self {
        if let StoreError::NotFound = source {
            return ApiError::NotFound;
        }
        error!("{}: {}", context, source);
        ApiError::Storage { context, source }
    }
}

impl From<ValidationReport> for ApiError {
    fn from(report: ValidationReport) -> Self {
        ApiError::ValidationFailed(report)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldViolation]>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyBody
            | ApiError::EmptyBatch
            | ApiError::MalformedPayload(_)
            | ApiError::ValidationFailed(_)
            | ApiError::InvalidPathParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            ApiError::ValidationFailed(report) => Some(report.violations()),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: true,
            message: self.to_string(),
            details,
        })
    }
}
