//! Replaying accepted connections from the Heyreach API into the store.
//!
//! Webhooks only cover events delivered while the receiver was running. The
//! backfill walks a campaign's leads and records a
//! `connection_request_accepted` event for every accepted lead the store has
//! not yet seen as connected.

use chrono::{DateTime, Utc};
use reachlog_core::{
  ingest::Ingestion,
  status::ProspectStatus,
  store::TrackerStore,
  taxonomy::CONNECTION_REQUEST_ACCEPTED,
  webhook::WebhookLead,
};
use serde_json::Value;

/// Status strings the API uses for an accepted connection.
const ACCEPTED_STATUSES: &[&str] = &["accepted", "connected", "connection_accepted"];

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub total:           usize,
  pub accepted:        usize,
  pub backfilled:      usize,
  pub already_present: usize,
  pub skipped:         usize,
}

/// Whether the API reports this lead's connection request as accepted.
pub fn is_connection_accepted(lead: &Value) -> bool {
  let status_matches = ["status", "connectionStatus", "connection_status"]
    .iter()
    .filter_map(|key| lead.get(key).and_then(Value::as_str))
    .any(|s| ACCEPTED_STATUSES.contains(&s.trim().to_ascii_lowercase().as_str()));

  let flagged = ["isConnected", "is_connected"]
    .iter()
    .any(|key| lead.get(key).and_then(Value::as_bool).unwrap_or(false));

  status_matches || flagged
}

/// Build the ingestion for an accepted lead. `None` when the lead has no
/// usable profile URL or is not a lead object at all.
pub fn lead_ingestion(lead: &Value, now: DateTime<Utc>) -> Option<Ingestion> {
  let parsed: WebhookLead = serde_json::from_value(lead.clone()).ok()?;
  let profile_url = parsed.profile_url()?;

  Some(Ingestion {
    profile_url,
    attributes: parsed.attributes(),
    event_type: CONNECTION_REQUEST_ACCEPTED.to_string(),
    occurred_at: now,
    received_at: now,
    payload: lead.to_string(),
  })
}

/// Record every accepted lead in `leads`. With `dry_run`, only counts what
/// would be written.
pub async fn run<S: TrackerStore>(
  store: &S,
  leads: &[Value],
  dry_run: bool,
) -> Result<Summary, S::Error> {
  let mut summary = Summary {
    total: leads.len(),
    ..Summary::default()
  };

  for lead in leads.iter().filter(|l| is_connection_accepted(l)) {
    summary.accepted += 1;

    let Some(ingestion) = lead_ingestion(lead, Utc::now()) else {
      tracing::warn!(lead = %lead, "accepted lead has no profile URL, skipping");
      summary.skipped += 1;
      continue;
    };

    let existing = store.find_prospect_by_url(ingestion.profile_url.clone()).await?;
    if existing.is_some_and(|p| p.status == ProspectStatus::Connected) {
      tracing::debug!(profile_url = %ingestion.profile_url, "already connected");
      summary.already_present += 1;
      continue;
    }

    if dry_run {
      tracing::info!(profile_url = %ingestion.profile_url, "would backfill");
    } else {
      let ingested = store.ingest(ingestion).await?;
      tracing::info!(
        prospect_id = ingested.prospect.id,
        profile_url = %ingested.prospect.profile_url,
        "backfilled accepted connection"
      );
    }
    summary.backfilled += 1;
  }

  Ok(summary)
}
