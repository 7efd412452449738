use lambda_http::{http::StatusCode, Body, Error, Response};
use taskboard_atoms::StorageError;

/// A client-facing failure: a status code and the message placed in the
/// `{"error": ...}` body.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub const INTERNAL_MESSAGE: &str = "Internal server error.";

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    /// Log `err` with `context` and hide it behind a generic 500.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    /// Map a storage failure that no handler-specific arm caught.
    pub fn storage(context: &str, err: StorageError) -> Self {
        match err {
            StorageError::LimitReached => Self::bad_request(crate::messages::MAX_BOARDS),
            other => Self::internal(context, other),
        }
    }

    pub fn into_response(self) -> Response<Body> {
        let body = serde_json::json!({ "error": self.message }).to_string();
        let mut resp = Response::new(Body::from(body));
        *resp.status_mut() = self.status;
        resp.headers_mut().insert(
            "Content-Type",
            lambda_http::http::HeaderValue::from_static("application/json"),
        );
        resp
    }
}

/// Collapse a handler outcome into what the lambda router returns.
pub fn respond(result: Result<Response<Body>, ApiError>) -> Result<Response<Body>, Error> {
    Ok(result.unwrap_or_else(ApiError::into_response))
}
