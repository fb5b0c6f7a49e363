//! RPC status categories shared by every service.
//!
//! Each failed call returns a JSON body `{"code": ..., "message": ...}` with an
//! HTTP status derived from the code. The set of codes is closed so callers can
//! branch on it without parsing messages.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    AlreadyExists,
    DeadlineExceeded,
    Unavailable,
    Internal,
}

impl Code {
    pub fn http_status(self) -> StatusCode {
        match self {
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::Unauthenticated => StatusCode::UNAUTHORIZED,
            Code::PermissionDenied => StatusCode::FORBIDDEN,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::AlreadyExists => StatusCode::CONFLICT,
            Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failed RPC: stable code plus a caller-safe message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(Code::Unauthenticated, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(Code::PermissionDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(Code::AlreadyExists, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    /// Logs the underlying failure with its operation context and returns a
    /// generic internal status that does not expose it.
    pub fn internal_from(op: &'static str, err: &anyhow::Error) -> Self {
        tracing::error!(op, error = %format!("{err:#}"), "internal error");
        Self::internal(format!("{op} failed"))
    }

    /// Boundary mapping for catalogue and order storage failures.
    pub fn from_store(op: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(entity) => Self::already_exists(format!("{entity} already exists")),
            StoreError::NotFound(entity) => Self::not_found(format!("{entity} not found")),
            StoreError::MissingReference(entity) => {
                Self::invalid_argument(format!("unknown {entity}"))
            }
            StoreError::Unexpected(e) => Self::internal_from(op, &e),
        }
    }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_expected_http_statuses() {
        assert_eq!(Code::InvalidArgument.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Code::Unauthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Code::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(Code::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(Code::AlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(Code::Internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn status_serializes_with_snake_case_code() {
        let json = serde_json::to_string(&Status::permission_denied("nope")).unwrap();
        assert_eq!(json, r#"{"code":"permission_denied","message":"nope"}"#);

        let back: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, Code::PermissionDenied);
    }

    #[test]
    fn store_errors_map_to_codes() {
        let cases = [
            (StoreError::AlreadyExists("item"), Code::AlreadyExists),
            (StoreError::NotFound("order"), Code::NotFound),
            (StoreError::MissingReference("item"), Code::InvalidArgument),
            (StoreError::Unexpected(anyhow::anyhow!("pool closed")), Code::Internal),
        ];
        for (err, code) in cases {
            assert_eq!(Status::from_store("op", err).code, code);
        }
    }

    #[test]
    fn internal_from_hides_error_detail() {
        let err = anyhow::anyhow!("relation \"users\" does not exist");
        let status = Status::internal_from("login", &err);
        assert_eq!(status.code, Code::Internal);
        assert!(!status.message.contains("relation"));
    }
}
