//! Event — one immutable record of an inbound webhook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logged webhook. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub id:          i64,
  pub prospect_id: i64,
  /// Free-form event type from the upstream taxonomy.
  pub event_type:  String,
  pub lead_id:     Option<String>,
  /// The original body, kept verbatim for audit.
  pub payload:     serde_json::Value,
  pub received_at: DateTime<Utc>,
}

/// Input to [`crate::store::TrackerStore::append_event`].
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub prospect_id: i64,
  pub event_type:  String,
  pub lead_id:     Option<String>,
  /// Raw JSON text as received.
  pub payload:     String,
  pub received_at: DateTime<Utc>,
}
