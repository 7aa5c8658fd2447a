use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use votelens_common::VotelensError;

/// Error returned by every handler, rendered as `{ "error": ..., "details"?: ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<VotelensError> for ApiError {
    fn from(err: VotelensError) -> Self {
        let message = err.to_string();
        match err {
            VotelensError::InvalidInput(msg) => Self::bad_request(msg),
            VotelensError::Unauthorized(msg) => Self::unauthorized(msg),
            VotelensError::NotFound(msg) => Self::not_found(msg),
            VotelensError::NoJson { snippet } => {
                Self::new(StatusCode::BAD_GATEWAY, message).with_details(Value::String(snippet))
            }
            VotelensError::Upstream(_) | VotelensError::Validation(_) => {
                Self::new(StatusCode::BAD_GATEWAY, message)
            }
            VotelensError::Timeout(_) => Self::new(StatusCode::GATEWAY_TIMEOUT, message),
            VotelensError::Config(_) | VotelensError::Store(_) | VotelensError::Internal(_) => {
                tracing::error!(error = %message, "api.internal_error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.message });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}
