//! API error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use endoors_core::error::{EndoorsError, ErrorKind};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(
        status: StatusCode,
        kind: ErrorKind,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorKind::Validation, message, "BAD_REQUEST")
    }

    /// Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Validation,
            message,
            "VALIDATION_ERROR",
        )
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Internal,
            message,
            "INTERNAL_ERROR",
        )
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON in request body: {}", rejection.body_text()))
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    code: String,
    message: String,
    retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                kind: self.kind,
                code: self.code,
                message: self.message,
                retryable: self.kind.is_retryable(),
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<EndoorsError> for ApiError {
    fn from(err: EndoorsError) -> Self {
        let kind = err.kind();
        match &err {
            EndoorsError::InvalidLabel { .. } | EndoorsError::InvalidName(_) => {
                ApiError::validation(err.to_string())
            }
            EndoorsError::InvalidAddress(_) | EndoorsError::HexError(_) => {
                ApiError::bad_request(err.to_string())
            }
            EndoorsError::AlreadyTaken(_) => {
                ApiError::new(StatusCode::CONFLICT, kind, err.to_string(), "ALREADY_TAKEN")
            }
            EndoorsError::NotVerified(_) => {
                ApiError::new(StatusCode::FORBIDDEN, kind, err.to_string(), "NOT_VERIFIED")
            }
            EndoorsError::NotSupported(_) => {
                ApiError::new(StatusCode::NOT_IMPLEMENTED, kind, err.to_string(), "NOT_SUPPORTED")
            }
            EndoorsError::FinalityTimeout { .. } => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, kind, err.to_string(), "FINALITY_TIMEOUT")
            }
            EndoorsError::ConfigError(_) => {
                warn!(error = %err, "Request refused by configuration");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    kind,
                    kind.user_hint(),
                    "REGISTRATION_UNAVAILABLE",
                )
            }
            // Transport details stay in the logs.
            EndoorsError::LookupFailure { .. }
            | EndoorsError::SubmissionFailure(_)
            | EndoorsError::SubmissionReverted(_)
            | EndoorsError::NetworkFailure(_)
            | EndoorsError::TransactionReverted { .. } => {
                warn!(error = %err, kind = %kind, "Upstream ledger error");
                ApiError::new(
                    StatusCode::BAD_GATEWAY,
                    kind,
                    kind.user_hint(),
                    kind.as_str().to_uppercase(),
                )
            }
            EndoorsError::JsonError(_) | EndoorsError::InternalError(_) => {
                error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
