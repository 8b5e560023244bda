//! The `TrackerStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `reachlog-store-sqlite`).
//! The HTTP layer and the backfill tool depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  event::{Event, NewEvent},
  ingest::{Ingested, Ingestion},
  prospect::{LeadAttributes, Prospect},
  stats::Stats,
  status::ProspectStatus,
};

// ─── Query types ─────────────────────────────────────────────────────────────

pub const DEFAULT_PROSPECT_LIMIT: usize = 50;
pub const MAX_PROSPECT_LIMIT: usize = 100;
pub const DEFAULT_EVENT_LIMIT: usize = 100;
pub const MAX_EVENT_LIMIT: usize = 500;

/// Parameters for [`TrackerStore::list_prospects`].
#[derive(Debug, Clone, Default)]
pub struct ProspectQuery {
  /// Exact status match.
  pub status: Option<ProspectStatus>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl ProspectQuery {
  /// The requested limit clamped to `1..=MAX_PROSPECT_LIMIT`.
  pub fn limit(&self) -> usize {
    clamp_limit(self.limit, DEFAULT_PROSPECT_LIMIT, MAX_PROSPECT_LIMIT)
  }

  pub fn offset(&self) -> usize { self.offset.unwrap_or(0) }
}

/// Parameters for [`TrackerStore::list_events`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  /// Exact event-type match.
  pub event_type: Option<String>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

impl EventQuery {
  /// The requested limit clamped to `1..=MAX_EVENT_LIMIT`.
  pub fn limit(&self) -> usize {
    clamp_limit(self.limit, DEFAULT_EVENT_LIMIT, MAX_EVENT_LIMIT)
  }

  pub fn offset(&self) -> usize { self.offset.unwrap_or(0) }
}

fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
  requested.unwrap_or(default).clamp(1, max)
}

/// One page of a listing plus the number of rows matching the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
}

/// A prospect with its full event history in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProspectDetail {
  pub prospect: Prospect,
  pub events:   Vec<Event>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a reachlog storage backend.
///
/// Prospects are upserted by profile URL and never deleted. Events are
/// append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Prospects ─────────────────────────────────────────────────────────

  /// Resolve the prospect for `profile_url`, creating it as `qualified` if it
  /// does not exist. Present attributes overwrite stored ones; the status is
  /// never touched here. Concurrent calls for the same URL never create two
  /// records.
  fn get_or_create_prospect(
    &self,
    profile_url: String,
    attributes: LeadAttributes,
  ) -> impl Future<Output = Result<Prospect, Self::Error>> + Send + '_;

  /// Apply the status rule for `event_type`, stamping the milestone with
  /// `at`. Always touches `updated_at`, even when the rule does not fire.
  fn apply_status_transition(
    &self,
    prospect_id: i64,
    event_type: String,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Prospect, Self::Error>> + Send + '_;

  /// Retrieve a prospect by id. Returns `None` if not found.
  fn get_prospect(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Prospect>, Self::Error>> + Send + '_;

  /// Retrieve a prospect by its profile URL.
  fn find_prospect_by_url(
    &self,
    profile_url: String,
  ) -> impl Future<Output = Result<Option<Prospect>, Self::Error>> + Send + '_;

  /// Most recently created first.
  fn list_prospects(
    &self,
    query: ProspectQuery,
  ) -> impl Future<Output = Result<Page<Prospect>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Append an event. Fails if `prospect_id` does not exist.
  fn append_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Most recently received first.
  fn list_events(
    &self,
    query: EventQuery,
  ) -> impl Future<Output = Result<Page<Event>, Self::Error>> + Send + '_;

  /// All events for one prospect, oldest first.
  fn list_events_for_prospect(
    &self,
    prospect_id: i64,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Get-or-create the prospect, apply the status rule and append the event
  /// as one atomic unit. On failure nothing is written.
  fn ingest(
    &self,
    input: Ingestion,
  ) -> impl Future<Output = Result<Ingested, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The prospect plus its chronological event list. `None` if the id does
  /// not resolve.
  fn prospect_detail(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ProspectDetail>, Self::Error>> + Send + '_;

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  /// Confirm the backing storage is reachable.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
