//! Handler for `GET /stats`.

use std::sync::Arc;

use axum::{Json, extract::State};
use reachlog_core::{stats::Stats, store::TrackerStore};

use crate::error::ApiError;

/// `GET /stats`
pub async fn handler<S>(State(store): State<Arc<S>>) -> Result<Json<Stats>, ApiError>
where
  S: TrackerStore,
{
  let stats = store.stats().await.map_err(ApiError::store)?;
  Ok(Json(stats))
}
