//! Error responses.
//!
//! # Responsibilities
//! - Define every request-level failure the edge can produce
//! - Render failures as JSON bodies with a fixed `error` field
//! - Hide failure details from clients in production
//! - Convert handler panics into the same 500 body
//!
//! # Design Decisions
//! - Errors are caught closest to where they occur; everything else lands here
//! - Upstream transport failures become 502, never 500
//! - GET requests never produce `NotFound` (SPA fallback owns unknown paths)

use std::any::Any;

use axum::{
    body::Body,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::catch_panic::ResponseForPanic;

use crate::config::RunMode;

/// Message shown instead of internal failure text in production.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Something went wrong";

/// Message shown for every upstream transport failure.
pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str = "Failed to connect to backend service";

/// Request-level failures.
#[derive(Debug, Error)]
pub enum EdgeError {
    /// Connection or transport failure while forwarding to the gateway.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Request body too large to buffer for reconstruction.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Non-GET request for a path nothing serves.
    #[error("Cannot {method} {path}")]
    NotFound { method: Method, path: String },

    /// Anything unexpected.
    #[error("{0}")]
    Internal(String),
}

impl EdgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            EdgeError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            EdgeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            EdgeError::NotFound { .. } => StatusCode::NOT_FOUND,
            EdgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body returned to the browser.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Renders [`EdgeError`]s according to the run mode.
#[derive(Debug, Clone, Copy)]
pub struct ErrorRenderer {
    production: bool,
}

impl ErrorRenderer {
    pub fn new(mode: &RunMode) -> Self {
        Self {
            production: mode.is_production(),
        }
    }

    /// Build the JSON body for an error without logging it.
    pub fn body(&self, err: &EdgeError) -> ErrorBody {
        match err {
            EdgeError::UpstreamUnavailable(detail) => ErrorBody {
                error: "Bad Gateway",
                message: UPSTREAM_UNAVAILABLE_MESSAGE.to_string(),
                details: (!self.production).then(|| detail.clone()),
            },
            EdgeError::PayloadTooLarge { .. } => ErrorBody {
                error: "Payload Too Large",
                message: err.to_string(),
                details: None,
            },
            EdgeError::NotFound { .. } => ErrorBody {
                error: "Not Found",
                message: err.to_string(),
                details: None,
            },
            EdgeError::Internal(message) => ErrorBody {
                error: "Internal Server Error",
                message: if self.production {
                    GENERIC_INTERNAL_MESSAGE.to_string()
                } else {
                    message.clone()
                },
                details: None,
            },
        }
    }

    /// Render an error response. Internal failures are logged here.
    pub fn render(&self, err: &EdgeError) -> Response {
        if let EdgeError::Internal(message) = err {
            tracing::error!(error = %message, "Unhandled request failure");
        }
        (err.status(), Json(self.body(err))).into_response()
    }
}

/// Last-resort handler turning panics into a 500 JSON response.
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    renderer: ErrorRenderer,
}

impl PanicResponder {
    pub fn new(renderer: ErrorRenderer) -> Self {
        Self { renderer }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "request handler panicked".to_string()
        };
        self.renderer.render(&EdgeError::Internal(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(production: bool) -> ErrorRenderer {
        let mode = if production {
            RunMode::Production
        } else {
            RunMode::default()
        };
        ErrorRenderer::new(&mode)
    }

    #[test]
    fn test_upstream_details_only_outside_production() {
        let err = EdgeError::UpstreamUnavailable("connection refused".into());

        let dev = serde_json::to_value(renderer(false).body(&err)).unwrap();
        assert_eq!(dev["error"], "Bad Gateway");
        assert_eq!(dev["message"], UPSTREAM_UNAVAILABLE_MESSAGE);
        assert_eq!(dev["details"], "connection refused");

        let prod = serde_json::to_value(renderer(true).body(&err)).unwrap();
        assert_eq!(prod["error"], "Bad Gateway");
        assert!(prod.get("details").is_none());
    }

    #[test]
    fn test_internal_message_hidden_in_production() {
        let err = EdgeError::Internal("index.html missing".into());

        assert_eq!(renderer(false).body(&err).message, "index.html missing");
        assert_eq!(renderer(true).body(&err).message, GENERIC_INTERNAL_MESSAGE);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            EdgeError::UpstreamUnavailable(String::new()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            EdgeError::PayloadTooLarge { limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let not_found = EdgeError::NotFound {
            method: Method::POST,
            path: "/nowhere".into(),
        };
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Cannot POST /nowhere");
    }

    #[test]
    fn test_panic_payload_becomes_internal_error() {
        let mut responder = PanicResponder::new(renderer(false));
        let response = responder.response_for_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
