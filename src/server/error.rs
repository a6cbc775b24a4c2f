//! Error responses for the JSON API.
//!
//! Every failure leaves a handler as an [`ApiError`], rendered as
//! `{"error": "..."}` plus `details` for validation failures. Internal errors
//! are logged here and replaced by a generic message.

use crate::{
    core::validation::FieldError,
    errors::{Error, ErrorKind},
};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// HTTP status for each error class.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A JSON error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<Vec<FieldError>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl ApiError {
    /// 401 `Unauthorized`.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
            details: None,
        }
    }

    /// 405 for form posts without a supported method override.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: "Method not allowed".to_string(),
            details: None,
        }
    }

    /// 400 with field-level details.
    #[must_use]
    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation error".to_string(),
            details: Some(fields),
        }
    }

    /// 500 with a message that is safe to show.
    #[must_use]
    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            details: None,
        }
    }

    /// Maps a core error for a resource labelled `label` (e.g. `"Expense"`).
    ///
    /// `failure` is the public message used when the error is internal.
    #[must_use]
    pub fn from_error(err: Error, label: &str, failure: &str) -> Self {
        let status = status_for(err.kind());
        match err {
            Error::Unauthorized => Self::unauthorized(),
            Error::Validation { fields } => Self::validation(fields),
            Error::NotFound { .. } => Self {
                status,
                message: format!("{label} not found"),
                details: None,
            },
            Error::Conflict { message } => Self {
                status,
                message,
                details: None,
            },
            other => {
                tracing::error!("{failure}: {other}");
                Self::internal(failure)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(vec![FieldError::new("body", &rejection.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}
