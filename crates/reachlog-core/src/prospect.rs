//! Prospect — a tracked LinkedIn contact and its outreach state.
//!
//! Prospects are keyed by their profile URL. Every inbound event for a URL
//! resolves to the same record; contact attributes are merged in as they
//! arrive and the status is driven by the [`crate::taxonomy`] rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::ProspectStatus;

// ─── Prospect ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
  pub id:                     i64,
  /// Natural key; unique across the store.
  pub profile_url:            String,
  pub first_name:             Option<String>,
  pub last_name:              Option<String>,
  pub company:                Option<String>,
  pub title:                  Option<String>,
  pub email:                  Option<String>,
  /// The upstream (Heyreach) lead identifier.
  pub lead_id:                Option<String>,
  pub status:                 ProspectStatus,
  pub connection_sent_at:     Option<DateTime<Utc>>,
  pub connection_accepted_at: Option<DateTime<Utc>>,
  pub blacklisted:            bool,
  pub created_at:             DateTime<Utc>,
  pub updated_at:             DateTime<Utc>,
}

// ─── LeadAttributes ──────────────────────────────────────────────────────────

/// Optional contact attributes carried by an inbound event.
///
/// Absent attributes never clear a stored value; present ones overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadAttributes {
  pub lead_id:    Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub company:    Option<String>,
  pub title:      Option<String>,
  pub email:      Option<String>,
}

impl LeadAttributes {
  /// Trim every attribute and treat blank strings as absent.
  pub fn normalized(self) -> Self {
    Self {
      lead_id:    non_blank(self.lead_id),
      first_name: non_blank(self.first_name),
      last_name:  non_blank(self.last_name),
      company:    non_blank(self.company),
      title:      non_blank(self.title),
      email:      non_blank(self.email),
    }
  }
}

/// `Some(trimmed)` if `value` has any non-whitespace content.
pub fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}
