//! Handlers for `/prospects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/prospects` | Optional `status`, `limit` (≤ 100), `offset` |
//! | `GET`  | `/prospects/{id}` | Prospect plus chronological events; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use reachlog_core::{
  prospect::Prospect,
  status::ProspectStatus,
  store::{ProspectDetail, ProspectQuery, TrackerStore},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Exact status match; an empty value means no filter.
  pub status: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProspectList {
  pub prospects: Vec<Prospect>,
  pub total:     u64,
}

/// `GET /prospects[?status=<status>][&limit=..][&offset=..]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ProspectList>, ApiError>
where
  S: TrackerStore,
{
  let status = params
    .status
    .as_deref()
    .filter(|s| !s.is_empty())
    .map(ProspectStatus::parse)
    .transpose()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let page = store
    .list_prospects(ProspectQuery {
      status,
      limit: params.limit,
      offset: params.offset,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(ProspectList {
    prospects: page.items,
    total:     page.total,
  }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /prospects/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<ProspectDetail>, ApiError>
where
  S: TrackerStore,
{
  let detail = store
    .prospect_detail(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("prospect {id} not found")))?;
  Ok(Json(detail))
}
