// Error types for the provider layer and the HTTP route envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

// Errors raised by services talking to the upstream providers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing provider credentials: {0}")]
    MissingCredentials(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{status} {status_text} - {body}")]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Upstream { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    // Only HTTP 429 is considered retryable
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    // Best-effort extraction of the vendor's own error description, which
    // arrives as {"errors":[{"code":..,"title":..,"detail":..}]}
    pub fn vendor_detail(&self) -> Option<String> {
        let ApiError::Upstream { body, .. } = self else {
            return None;
        };
        let parsed: Value = serde_json::from_str(body).ok()?;
        let first = parsed.get("errors")?.as_array()?.first()?;

        let title = first.get("title").and_then(Value::as_str);
        let detail = first.get("detail").and_then(Value::as_str);
        match (title, detail) {
            (Some(t), Some(d)) => Some(format!("{}: {}", t, d)),
            (Some(t), None) => Some(t.to_string()),
            (None, Some(d)) => Some(d.to_string()),
            (None, None) => None,
        }
    }

    // Message suitable for the route envelope
    pub fn describe(&self) -> String {
        match (self, self.vendor_detail()) {
            (ApiError::Upstream { status, status_text, .. }, Some(detail)) => {
                format!("{} {} - {}", status, status_text, detail)
            }
            _ => self.to_string(),
        }
    }
}

// Error envelope returned by every route: {"error":{"code":..,"message":..}}
#[derive(Debug)]
pub struct RouteError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl RouteError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", message)
    }

    pub fn upstream(code: &'static str, err: &ApiError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, err.describe())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, "Route failed: {}", self.message);
        } else {
            tracing::debug!(code = self.code, "Route rejected request: {}", self.message);
        }

        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));

        (self.status, body).into_response()
    }
}
