//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that lexical order in SQL matches time order.

use chrono::{DateTime, SecondsFormat, Utc};
use reachlog_core::{event::Event, prospect::Prospect, status::ProspectStatus};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawProspect::from_row`].
pub const PROSPECT_COLUMNS: &str = "id, profile_url, first_name, last_name, \
  company, title, email, lead_id, status, connection_sent_at, \
  connection_accepted_at, blacklisted, created_at, updated_at";

/// Raw values read directly from a `prospects` row.
pub struct RawProspect {
  pub id:                     i64,
  pub profile_url:            String,
  pub first_name:             Option<String>,
  pub last_name:              Option<String>,
  pub company:                Option<String>,
  pub title:                  Option<String>,
  pub email:                  Option<String>,
  pub lead_id:                Option<String>,
  pub status:                 String,
  pub connection_sent_at:     Option<String>,
  pub connection_accepted_at: Option<String>,
  pub blacklisted:            bool,
  pub created_at:             String,
  pub updated_at:             String,
}

impl RawProspect {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                     row.get(0)?,
      profile_url:            row.get(1)?,
      first_name:             row.get(2)?,
      last_name:              row.get(3)?,
      company:                row.get(4)?,
      title:                  row.get(5)?,
      email:                  row.get(6)?,
      lead_id:                row.get(7)?,
      status:                 row.get(8)?,
      connection_sent_at:     row.get(9)?,
      connection_accepted_at: row.get(10)?,
      blacklisted:            row.get(11)?,
      created_at:             row.get(12)?,
      updated_at:             row.get(13)?,
    })
  }

  pub fn into_prospect(self) -> Result<Prospect> {
    Ok(Prospect {
      id:                     self.id,
      profile_url:            self.profile_url,
      first_name:             self.first_name,
      last_name:              self.last_name,
      company:                self.company,
      title:                  self.title,
      email:                  self.email,
      lead_id:                self.lead_id,
      status:                 ProspectStatus::parse(&self.status)?,
      connection_sent_at:     decode_opt_dt(self.connection_sent_at.as_deref())?,
      connection_accepted_at: decode_opt_dt(
        self.connection_accepted_at.as_deref(),
      )?,
      blacklisted:            self.blacklisted,
      created_at:             decode_dt(&self.created_at)?,
      updated_at:             decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawEvent::from_row`].
pub const EVENT_COLUMNS: &str =
  "id, prospect_id, event_type, lead_id, raw_payload, received_at";

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub id:          i64,
  pub prospect_id: i64,
  pub event_type:  String,
  pub lead_id:     Option<String>,
  pub raw_payload: String,
  pub received_at: String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      prospect_id: row.get(1)?,
      event_type:  row.get(2)?,
      lead_id:     row.get(3)?,
      raw_payload: row.get(4)?,
      received_at: row.get(5)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:          self.id,
      prospect_id: self.prospect_id,
      event_type:  self.event_type,
      lead_id:     self.lead_id,
      payload:     decode_payload(self.raw_payload),
      received_at: decode_dt(&self.received_at)?,
    })
  }
}

/// Parse a stored payload. Text that is not JSON is surfaced as a JSON
/// string so one odd row never breaks a listing.
pub fn decode_payload(raw: String) -> serde_json::Value {
  serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_ordered() {
    let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let later = whole + chrono::Duration::microseconds(500_000);

    let a = encode_dt(whole);
    let b = encode_dt(later);
    assert_eq!(a, "2024-01-01T00:00:00.000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn non_json_payload_decodes_as_string() {
    assert_eq!(decode_payload(r#"{"a":1}"#.into())["a"], 1);
    assert_eq!(
      decode_payload("not json at all".into()),
      serde_json::Value::String("not json at all".into())
    );
  }

  #[test]
  fn bad_timestamp_is_a_parse_error() {
    assert!(matches!(decode_dt("not a date"), Err(Error::DateParse(_))));
  }
}
