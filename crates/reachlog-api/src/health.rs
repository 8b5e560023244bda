//! Service banner and health probe.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use reachlog_core::store::TrackerStore;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
  pub status:    &'static str,
  pub database:  &'static str,
  pub version:   &'static str,
  pub timestamp: DateTime<Utc>,
}

/// `GET /health` — 503 when the store cannot be reached.
pub async fn check<S>(State(store): State<Arc<S>>) -> (StatusCode, Json<HealthResponse>)
where
  S: TrackerStore,
{
  let (code, status, database) = match store.ping().await {
    Ok(()) => (StatusCode::OK, "ok", "connected"),
    Err(e) => {
      tracing::error!(error = %e, "database health check failed");
      (StatusCode::SERVICE_UNAVAILABLE, "degraded", "error")
    }
  };

  (
    code,
    Json(HealthResponse {
      status,
      database,
      version: env!("CARGO_PKG_VERSION"),
      timestamp: Utc::now(),
    }),
  )
}

/// `GET /`
pub async fn index() -> Json<Value> {
  Json(json!({
    "message": "reachlog webhook tracker",
    "webhook": "/webhooks/heyreach",
    "health":  "/health",
  }))
}
