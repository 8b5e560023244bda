//! Aggregate counts over the prospect and event tables.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator as _;

use crate::status::ProspectStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
  pub total_prospects:       u64,
  /// Always holds every status, zero-filled.
  pub by_status:             BTreeMap<ProspectStatus, u64>,
  pub total_events:          u64,
  /// `connected / (connection_sent + connected + expired)`; `None` while no
  /// connection request has gone out.
  pub acceptance_rate:       Option<f64>,
  pub last_webhook_received: Option<DateTime<Utc>>,
}

impl Stats {
  /// Assemble stats from per-status counts. Statuses missing from `counts`
  /// are reported as zero.
  pub fn from_counts(
    counts: impl IntoIterator<Item = (ProspectStatus, u64)>,
    total_events: u64,
    last_webhook_received: Option<DateTime<Utc>>,
  ) -> Self {
    let mut by_status: BTreeMap<ProspectStatus, u64> =
      ProspectStatus::iter().map(|s| (s, 0)).collect();
    for (status, count) in counts {
      *by_status.entry(status).or_default() += count;
    }

    Self {
      total_prospects: by_status.values().sum(),
      acceptance_rate: acceptance_rate(&by_status),
      by_status,
      total_events,
      last_webhook_received,
    }
  }
}

/// Share of contacted prospects that accepted.
pub fn acceptance_rate(by_status: &BTreeMap<ProspectStatus, u64>) -> Option<f64> {
  let contacted: u64 = by_status
    .iter()
    .filter(|(status, _)| status.is_contacted())
    .map(|(_, count)| count)
    .sum();
  if contacted == 0 {
    return None;
  }
  let connected = by_status
    .get(&ProspectStatus::Connected)
    .copied()
    .unwrap_or(0);
  Some(connected as f64 / contacted as f64)
}
