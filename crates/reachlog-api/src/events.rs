//! Handler for `GET /events`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use reachlog_core::{
  event::Event,
  store::{EventQuery, TrackerStore},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Exact event-type match; an empty value means no filter.
  pub event_type: Option<String>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EventList {
  pub events: Vec<Event>,
  pub total:  u64,
}

/// `GET /events[?event_type=<type>][&limit=..][&offset=..]` — newest first.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<EventList>, ApiError>
where
  S: TrackerStore,
{
  let page = store
    .list_events(EventQuery {
      event_type: params.event_type.filter(|t| !t.is_empty()),
      limit:      params.limit,
      offset:     params.offset,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(EventList {
    events: page.items,
    total:  page.total,
  }))
}
