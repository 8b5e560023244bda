//! [`SqliteStore`] — the SQLite implementation of [`TrackerStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};

use reachlog_core::{
  event::{Event, NewEvent},
  ingest::{Ingested, Ingestion},
  prospect::{LeadAttributes, Prospect},
  stats::Stats,
  status::ProspectStatus,
  store::{EventQuery, Page, ProspectDetail, ProspectQuery, TrackerStore},
  taxonomy::status_transition,
};

use crate::{
  encode::{EVENT_COLUMNS, PROSPECT_COLUMNS, RawEvent, RawProspect, decode_dt, encode_dt},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A reachlog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto the connection's background thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────
//
// Synchronous building blocks run inside `conn.call` closures. They take a
// plain `&Connection` so they compose inside a transaction.

/// Insert the prospect or merge present attributes into the existing row.
/// Returns the prospect id. The uniqueness constraint on `profile_url` turns a
/// create/create race into an update.
fn upsert_prospect(
  conn:        &Connection,
  profile_url: &str,
  attrs:       &LeadAttributes,
  now:         &str,
) -> rusqlite::Result<i64> {
  conn.query_row(
    "INSERT INTO prospects (
       profile_url, first_name, last_name, company, title, email, lead_id,
       status, blacklisted, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9)
     ON CONFLICT (profile_url) DO UPDATE SET
       first_name = COALESCE(excluded.first_name, prospects.first_name),
       last_name  = COALESCE(excluded.last_name,  prospects.last_name),
       company    = COALESCE(excluded.company,    prospects.company),
       title      = COALESCE(excluded.title,      prospects.title),
       email      = COALESCE(excluded.email,      prospects.email),
       lead_id    = COALESCE(excluded.lead_id,    prospects.lead_id),
       updated_at = excluded.updated_at
     RETURNING id",
    rusqlite::params![
      profile_url,
      attrs.first_name,
      attrs.last_name,
      attrs.company,
      attrs.title,
      attrs.email,
      attrs.lead_id,
      ProspectStatus::default().as_str(),
      now,
    ],
    |row| row.get(0),
  )
}

/// Apply the status rule for `event_type`. Returns `false` if no prospect has
/// `id`.
fn apply_transition(
  conn:       &Connection,
  id:         i64,
  event_type: &str,
  at:         &str,
  now:        &str,
) -> rusqlite::Result<bool> {
  let changed = match status_transition(event_type) {
    Some(transition) => {
      let sql = format!(
        "UPDATE prospects SET status = ?1, {} = ?2, updated_at = ?3 WHERE id = ?4",
        transition.milestone.column()
      );
      conn.execute(
        &sql,
        rusqlite::params![transition.status.as_str(), at, now, id],
      )?
    }
    None => conn.execute(
      "UPDATE prospects SET updated_at = ?1 WHERE id = ?2",
      rusqlite::params![now, id],
    )?,
  };
  Ok(changed > 0)
}

fn insert_event(
  conn:        &Connection,
  prospect_id: i64,
  event_type:  &str,
  lead_id:     Option<&str>,
  payload:     &str,
  received_at: &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO events (prospect_id, event_type, lead_id, raw_payload, received_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![prospect_id, event_type, lead_id, payload, received_at],
  )?;
  Ok(conn.last_insert_rowid())
}

/// `usize` → SQLite integer, saturating instead of wrapping negative.
fn sql_count(n: usize) -> i64 {
  i64::try_from(n).unwrap_or(i64::MAX)
}

fn select_prospect(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawProspect>> {
  conn
    .query_row(
      &format!("SELECT {PROSPECT_COLUMNS} FROM prospects WHERE id = ?1"),
      rusqlite::params![id],
      RawProspect::from_row,
    )
    .optional()
}

fn select_event(conn: &Connection, id: i64) -> rusqlite::Result<RawEvent> {
  conn.query_row(
    &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
    rusqlite::params![id],
    RawEvent::from_row,
  )
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = Error;

  // ── Prospects ─────────────────────────────────────────────────────────────

  async fn get_or_create_prospect(
    &self,
    profile_url: String,
    attributes:  LeadAttributes,
  ) -> Result<Prospect> {
    let attrs = attributes.normalized();
    let now   = encode_dt(Utc::now());

    let raw: RawProspect = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = upsert_prospect(&tx, &profile_url, &attrs, &now)?;
        let raw = select_prospect(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_prospect()
  }

  async fn apply_status_transition(
    &self,
    prospect_id: i64,
    event_type:  String,
    at:          DateTime<Utc>,
  ) -> Result<Prospect> {
    let at_str  = encode_dt(at);
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawProspect> = self
      .conn
      .call(move |conn| {
        if !apply_transition(conn, prospect_id, &event_type, &at_str, &now_str)? {
          return Ok(None);
        }
        Ok(select_prospect(conn, prospect_id)?)
      })
      .await?;

    raw
      .ok_or(Error::ProspectNotFound(prospect_id))?
      .into_prospect()
  }

  async fn get_prospect(&self, id: i64) -> Result<Option<Prospect>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_prospect(conn, id)?))
      .await?;

    raw.map(RawProspect::into_prospect).transpose()
  }

  async fn find_prospect_by_url(&self, profile_url: String) -> Result<Option<Prospect>> {
    let raw: Option<RawProspect> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROSPECT_COLUMNS} FROM prospects WHERE profile_url = ?1"),
              rusqlite::params![profile_url],
              RawProspect::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProspect::into_prospect).transpose()
  }

  async fn list_prospects(&self, query: ProspectQuery) -> Result<Page<Prospect>> {
    let status     = query.status.map(ProspectStatus::as_str);
    let limit_val  = sql_count(query.limit());
    let offset_val = sql_count(query.offset());

    let (total, raws): (i64, Vec<RawProspect>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM prospects WHERE (?1 IS NULL OR status = ?1)",
          rusqlite::params![status],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {PROSPECT_COLUMNS} FROM prospects
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY created_at DESC, id DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![status, limit_val, offset_val],
            RawProspect::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(Page {
      items: raws
        .into_iter()
        .map(RawProspect::into_prospect)
        .collect::<Result<_>>()?,
      total: total as u64,
    })
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn append_event(&self, input: NewEvent) -> Result<Event> {
    let received_at = encode_dt(input.received_at);

    let raw: RawEvent = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = insert_event(
          &tx,
          input.prospect_id,
          &input.event_type,
          input.lead_id.as_deref(),
          &input.payload,
          &received_at,
        )?;
        let raw = select_event(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_event()
  }

  async fn list_events(&self, query: EventQuery) -> Result<Page<Event>> {
    let limit_val  = sql_count(query.limit());
    let offset_val = sql_count(query.offset());
    let event_type = query.event_type;

    let (total, raws): (i64, Vec<RawEvent>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM events WHERE (?1 IS NULL OR event_type = ?1)",
          rusqlite::params![event_type],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE (?1 IS NULL OR event_type = ?1)
           ORDER BY received_at DESC, id DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![event_type, limit_val, offset_val],
            RawEvent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(Page {
      items: raws
        .into_iter()
        .map(RawEvent::into_event)
        .collect::<Result<_>>()?,
      total: total as u64,
    })
  }

  async fn list_events_for_prospect(&self, prospect_id: i64) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE prospect_id = ?1
           ORDER BY received_at ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![prospect_id], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn ingest(&self, input: Ingestion) -> Result<Ingested> {
    let attrs       = input.attributes.normalized();
    let occurred_at = encode_dt(input.occurred_at);
    let received_at = encode_dt(input.received_at);

    let (raw_prospect, raw_event): (RawProspect, RawEvent) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let prospect_id = upsert_prospect(&tx, &input.profile_url, &attrs, &received_at)?;
        apply_transition(&tx, prospect_id, &input.event_type, &occurred_at, &received_at)?;
        let event_id = insert_event(
          &tx,
          prospect_id,
          &input.event_type,
          attrs.lead_id.as_deref(),
          &input.payload,
          &received_at,
        )?;

        let prospect = select_prospect(&tx, prospect_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        let event    = select_event(&tx, event_id)?;
        tx.commit()?;
        Ok((prospect, event))
      })
      .await?;

    Ok(Ingested {
      prospect: raw_prospect.into_prospect()?,
      event:    raw_event.into_event()?,
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn prospect_detail(&self, id: i64) -> Result<Option<ProspectDetail>> {
    let prospect = match self.get_prospect(id).await? {
      Some(p) => p,
      None    => return Ok(None),
    };

    let events = self.list_events_for_prospect(id).await?;
    Ok(Some(ProspectDetail { prospect, events }))
  }

  async fn stats(&self) -> Result<Stats> {
    let (counts, total_events, last): (Vec<(String, i64)>, i64, Option<String>) = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT status, COUNT(*) FROM prospects GROUP BY status")?;
        let counts = stmt
          .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let total_events: i64 =
          conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        let last: Option<String> =
          conn.query_row("SELECT MAX(received_at) FROM events", [], |row| row.get(0))?;

        Ok((counts, total_events, last))
      })
      .await?;

    let counts = counts
      .into_iter()
      .map(|(status, count)| Ok((ProspectStatus::parse(&status)?, count as u64)))
      .collect::<Result<Vec<_>>>()?;
    let last = last.as_deref().map(decode_dt).transpose()?;

    Ok(Stats::from_counts(counts, total_events as u64, last))
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
