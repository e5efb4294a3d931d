//! Liveness endpoint.
//!
//! Reports configuration, not live connectivity: the gateway is never probed,
//! so the edge stays healthy while the upstream is down.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub gateway_url: String,
    pub timestamp: String,
}

impl HealthReport {
    /// Snapshot for the given upstream at the current time.
    pub fn new(gateway_url: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: "frontend".to_string(),
            gateway_url: gateway_url.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl IntoResponse for HealthReport {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
