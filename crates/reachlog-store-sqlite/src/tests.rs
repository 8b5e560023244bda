//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use reachlog_core::{
  event::NewEvent,
  ingest::Ingestion,
  prospect::LeadAttributes,
  status::ProspectStatus,
  store::{EventQuery, ProspectQuery, TrackerStore},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() }

fn attrs(first_name: &str) -> LeadAttributes {
  LeadAttributes {
    lead_id:    Some("lead-1".into()),
    first_name: Some(first_name.into()),
    last_name:  Some("Lovelace".into()),
    company:    Some("Analytical Engines".into()),
    title:      Some("Engineer".into()),
    email:      None,
  }
}

fn ingestion(url: &str, event_type: &str, at: DateTime<Utc>) -> Ingestion {
  let payload = format!(
    r#"{{"event":"{event_type}","lead":{{"id":"lead-1","linkedInProfileUrl":"{url}","extra":{{"nested":true}}}}}}"#
  );
  Ingestion {
    profile_url: url.into(),
    attributes:  LeadAttributes {
      lead_id: Some("lead-1".into()),
      ..Default::default()
    },
    event_type:  event_type.into(),
    occurred_at: at,
    received_at: at,
    payload,
  }
}

// ─── Prospect store ──────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_creates_qualified_prospect() {
  let s = store().await;

  let p = s
    .get_or_create_prospect("https://li/in/ada".into(), attrs("Ada"))
    .await
    .unwrap();

  assert_eq!(p.profile_url, "https://li/in/ada");
  assert_eq!(p.status, ProspectStatus::Qualified);
  assert_eq!(p.first_name.as_deref(), Some("Ada"));
  assert_eq!(p.lead_id.as_deref(), Some("lead-1"));
  assert_eq!(p.email, None);
  assert!(!p.blacklisted);
  assert!(p.connection_sent_at.is_none());

  let fetched = s.get_prospect(p.id).await.unwrap().unwrap();
  assert_eq!(fetched, p);
}

#[tokio::test]
async fn get_or_create_merges_without_duplicating() {
  let s = store().await;
  let url = "https://li/in/ada".to_string();

  let first = s.get_or_create_prospect(url.clone(), attrs("Ada")).await.unwrap();
  s.apply_status_transition(first.id, "connection_request_sent".into(), t0())
    .await
    .unwrap();

  let second = s
    .get_or_create_prospect(
      url.clone(),
      LeadAttributes {
        email:      Some("ada@example.com".into()),
        first_name: Some("Augusta".into()),
        company:    Some("   ".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(second.id, first.id);
  assert_eq!(second.first_name.as_deref(), Some("Augusta"));
  assert_eq!(second.email.as_deref(), Some("ada@example.com"));
  // Absent and blank attributes never clear stored values.
  assert_eq!(second.company.as_deref(), Some("Analytical Engines"));
  assert_eq!(second.lead_id.as_deref(), Some("lead-1"));
  // Status belongs to the taxonomy rules, not the upsert.
  assert_eq!(second.status, ProspectStatus::ConnectionSent);

  let page = s.list_prospects(ProspectQuery::default()).await.unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn find_prospect_by_url() {
  let s = store().await;
  assert!(s.find_prospect_by_url("u".into()).await.unwrap().is_none());

  let p = s.get_or_create_prospect("u".into(), LeadAttributes::default()).await.unwrap();
  let found = s.find_prospect_by_url("u".into()).await.unwrap().unwrap();
  assert_eq!(found.id, p.id);
}

#[tokio::test]
async fn get_prospect_missing_returns_none() {
  let s = store().await;
  assert!(s.get_prospect(999).await.unwrap().is_none());
  assert!(s.prospect_detail(999).await.unwrap().is_none());
}

#[tokio::test]
async fn apply_status_transition_unknown_prospect_errors() {
  let s = store().await;
  let err = s
    .apply_status_transition(42, "connection_request_sent".into(), t0())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ProspectNotFound(42)));
}

#[tokio::test]
async fn unrecognised_event_only_touches_updated_at() {
  let s = store().await;
  let p = s.get_or_create_prospect("u".into(), LeadAttributes::default()).await.unwrap();

  let after = s
    .apply_status_transition(p.id, "message_reply_received".into(), t0())
    .await
    .unwrap();

  assert_eq!(after.status, ProspectStatus::Qualified);
  assert!(after.connection_sent_at.is_none());
  assert!(after.connection_accepted_at.is_none());
  assert!(after.updated_at >= p.updated_at);
}

// ─── Event log ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_event_requires_existing_prospect() {
  let s = store().await;
  let err = s
    .append_event(NewEvent {
      prospect_id: 7,
      event_type:  "connection_request_sent".into(),
      lead_id:     None,
      payload:     "{}".into(),
      received_at: t0(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn append_event_stores_payload_verbatim() {
  let s = store().await;
  let p = s.get_or_create_prospect("u".into(), LeadAttributes::default()).await.unwrap();

  let event = s
    .append_event(NewEvent {
      prospect_id: p.id,
      event_type:  "custom_signal".into(),
      lead_id:     Some("lead-9".into()),
      payload:     r#"{"event":"custom_signal","deep":{"list":[1,2,3]}}"#.into(),
      received_at: t0(),
    })
    .await
    .unwrap();

  assert_eq!(event.prospect_id, p.id);
  assert_eq!(event.lead_id.as_deref(), Some("lead-9"));
  assert_eq!(event.payload["deep"]["list"][2], 3);
  assert_eq!(event.received_at, t0());
}

#[tokio::test]
async fn non_json_payload_does_not_break_listings() {
  let s = store().await;
  let p = s.get_or_create_prospect("u".into(), LeadAttributes::default()).await.unwrap();

  let event = s
    .append_event(NewEvent {
      prospect_id: p.id,
      event_type:  "custom_signal".into(),
      lead_id:     None,
      payload:     "not json at all".into(),
      received_at: t0(),
    })
    .await
    .unwrap();
  assert_eq!(event.payload, serde_json::Value::String("not json at all".into()));

  let mut odd = ingestion("u", "message_sent", t0() + Duration::minutes(1));
  odd.payload = "<xml/>".into();
  s.ingest(odd).await.unwrap();

  let page = s.list_events(EventQuery::default()).await.unwrap();
  assert_eq!(page.total, 2);
  assert_eq!(page.items[0].payload, "<xml/>");

  let detail = s.prospect_detail(p.id).await.unwrap().unwrap();
  assert_eq!(detail.events.len(), 2);
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_ingestion_yields_one_prospect_and_n_events() {
  let s = store().await;
  let n = 5;

  for i in 0..n {
    s.ingest(ingestion("https://li/in/ada", "message_sent", t0() + Duration::minutes(i)))
      .await
      .unwrap();
  }

  let prospects = s.list_prospects(ProspectQuery::default()).await.unwrap();
  assert_eq!(prospects.total, 1);

  let events = s.list_events(EventQuery::default()).await.unwrap();
  assert_eq!(events.total, n as u64);
  assert!(events.items.iter().all(|e| e.prospect_id == prospects.items[0].id));
}

#[tokio::test]
async fn sent_then_accepted_stamps_both_milestones() {
  let s = store().await;
  let sent_at     = t0();
  let accepted_at = t0() + Duration::days(2);

  let sent = s
    .ingest(ingestion("u", "connection_request_sent", sent_at))
    .await
    .unwrap();
  assert_eq!(sent.prospect.status, ProspectStatus::ConnectionSent);
  assert_eq!(sent.prospect.connection_sent_at, Some(sent_at));
  assert_eq!(sent.event.event_type, "connection_request_sent");
  assert_eq!(sent.event.payload["lead"]["extra"]["nested"], true);

  let accepted = s
    .ingest(ingestion("u", "connection_request_accepted", accepted_at))
    .await
    .unwrap();
  assert_eq!(accepted.prospect.id, sent.prospect.id);
  assert_eq!(accepted.prospect.status, ProspectStatus::Connected);
  assert_eq!(accepted.prospect.connection_accepted_at, Some(accepted_at));
  assert_eq!(accepted.prospect.connection_sent_at, Some(sent_at));
}

#[tokio::test]
async fn unknown_event_type_is_logged_without_status_change() {
  let s = store().await;
  s.ingest(ingestion("u", "connection_request_sent", t0())).await.unwrap();

  let later = t0() + Duration::hours(1);
  let out = s.ingest(ingestion("u", "every_message_reply_received", later)).await.unwrap();

  assert_eq!(out.prospect.status, ProspectStatus::ConnectionSent);
  assert_eq!(out.prospect.connection_sent_at, Some(t0()));
  assert_eq!(out.prospect.updated_at, later);
  assert_eq!(s.list_events_for_prospect(out.prospect.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_sent_regresses_connected_prospect() {
  let s = store().await;
  s.ingest(ingestion("u", "connection_request_sent", t0())).await.unwrap();
  s.ingest(ingestion("u", "connection_request_accepted", t0() + Duration::days(1)))
    .await
    .unwrap();

  let resent_at = t0() + Duration::days(30);
  let out = s
    .ingest(ingestion("u", "connection_request_sent", resent_at))
    .await
    .unwrap();

  assert_eq!(out.prospect.status, ProspectStatus::ConnectionSent);
  assert_eq!(out.prospect.connection_sent_at, Some(resent_at));
  assert!(out.prospect.connection_accepted_at.is_some());
}

#[tokio::test]
async fn failed_ingestion_writes_nothing() {
  let s = store().await;
  s.execute_batch(
    "CREATE TRIGGER reject_boom BEFORE INSERT ON events
     WHEN NEW.event_type = 'boom'
     BEGIN SELECT RAISE(ABORT, 'boom rejected'); END;",
  )
  .await
  .unwrap();

  let err = s.ingest(ingestion("u", "boom", t0())).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));

  assert!(s.find_prospect_by_url("u".into()).await.unwrap().is_none());
  assert_eq!(s.list_events(EventQuery::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn concurrent_ingestion_of_new_url_creates_one_prospect() {
  let path = std::env::temp_dir().join(format!(
    "reachlog-race-{}-{}.db",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
  ));
  // Two independent connections so the race reaches SQLite itself.
  let a = SqliteStore::open(&path).await.unwrap();
  let b = SqliteStore::open(&path).await.unwrap();

  let (ra, rb) = tokio::join!(
    a.ingest(ingestion("https://li/in/race", "connection_request_sent", t0())),
    b.ingest(ingestion("https://li/in/race", "message_sent", t0())),
  );
  let (ra, rb) = (ra.unwrap(), rb.unwrap());
  assert_eq!(ra.prospect.id, rb.prospect.id);

  let page = a.list_prospects(ProspectQuery::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(a.list_events(EventQuery::default()).await.unwrap().total, 2);

  drop((a, b));
  for suffix in ["", "-wal", "-shm"] {
    let mut p = path.clone().into_os_string();
    p.push(suffix);
    let _ = std::fs::remove_file(p);
  }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_prospects_filters_and_paginates() {
  let s = store().await;
  for (i, (url, event)) in [
    ("a", "connection_request_accepted"),
    ("b", "connection_request_sent"),
    ("c", "connection_request_accepted"),
    ("d", "message_sent"),
  ]
  .into_iter()
  .enumerate()
  {
    s.ingest(ingestion(url, event, t0() + Duration::minutes(i as i64)))
      .await
      .unwrap();
  }

  let connected = s
    .list_prospects(ProspectQuery {
      status: Some(ProspectStatus::Connected),
      limit:  Some(1),
      offset: Some(0),
    })
    .await
    .unwrap();
  assert_eq!(connected.total, 2);
  assert_eq!(connected.items.len(), 1);
  assert_eq!(connected.items[0].status, ProspectStatus::Connected);
  // Most recently created first.
  assert_eq!(connected.items[0].profile_url, "c");

  let next = s
    .list_prospects(ProspectQuery {
      status: Some(ProspectStatus::Connected),
      limit:  Some(1),
      offset: Some(1),
    })
    .await
    .unwrap();
  assert_eq!(next.items[0].profile_url, "a");

  let all = s.list_prospects(ProspectQuery::default()).await.unwrap();
  let urls: Vec<_> = all.items.iter().map(|p| p.profile_url.as_str()).collect();
  assert_eq!(urls, ["d", "c", "b", "a"]);
}

#[tokio::test]
async fn huge_offset_returns_empty_page() {
  let s = store().await;
  s.ingest(ingestion("a", "message_sent", t0())).await.unwrap();

  let prospects = s
    .list_prospects(ProspectQuery {
      offset: Some(usize::MAX),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(prospects.total, 1);
  assert!(prospects.items.is_empty());

  let events = s
    .list_events(EventQuery {
      offset: Some(usize::MAX),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(events.total, 1);
  assert!(events.items.is_empty());
}

#[tokio::test]
async fn list_events_filters_and_orders() {
  let s = store().await;
  s.ingest(ingestion("a", "connection_request_sent", t0())).await.unwrap();
  s.ingest(ingestion("a", "message_sent", t0() + Duration::minutes(1))).await.unwrap();
  s.ingest(ingestion("b", "connection_request_sent", t0() + Duration::minutes(2)))
    .await
    .unwrap();

  let sent = s
    .list_events(EventQuery {
      event_type: Some("connection_request_sent".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(sent.total, 2);
  assert!(sent.items[0].received_at > sent.items[1].received_at);
  assert!(sent.items.iter().all(|e| e.event_type == "connection_request_sent"));

  let a = s.find_prospect_by_url("a".into()).await.unwrap().unwrap();
  let detail = s.prospect_detail(a.id).await.unwrap().unwrap();
  let types: Vec<_> = detail.events.iter().map(|e| e.event_type.as_str()).collect();
  assert_eq!(types, ["connection_request_sent", "message_sent"]);
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_on_empty_store() {
  let s = store().await;
  let stats = s.stats().await.unwrap();

  assert_eq!(stats.total_prospects, 0);
  assert_eq!(stats.total_events, 0);
  assert_eq!(stats.by_status.len(), 5);
  assert!(stats.by_status.values().all(|&c| c == 0));
  assert_eq!(stats.acceptance_rate, None);
  assert_eq!(stats.last_webhook_received, None);
}

#[tokio::test]
async fn stats_counts_statuses_and_rate() {
  let s = store().await;
  s.ingest(ingestion("a", "connection_request_sent", t0())).await.unwrap();
  s.ingest(ingestion("b", "connection_request_sent", t0())).await.unwrap();
  s.ingest(ingestion("c", "connection_request_accepted", t0())).await.unwrap();
  let last = t0() + Duration::hours(3);
  s.ingest(ingestion("d", "lead_tagged", last)).await.unwrap();

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total_prospects, 4);
  assert_eq!(stats.total_events, 4);
  assert_eq!(stats.by_status[&ProspectStatus::ConnectionSent], 2);
  assert_eq!(stats.by_status[&ProspectStatus::Connected], 1);
  assert_eq!(stats.by_status[&ProspectStatus::Qualified], 1);
  assert_eq!(stats.by_status[&ProspectStatus::Expired], 0);
  let rate = stats.acceptance_rate.unwrap();
  assert!((rate - 1.0 / 3.0).abs() < 1e-9);
  assert_eq!(stats.last_webhook_received, Some(last));
}

#[tokio::test]
async fn ping_succeeds() {
  let s = store().await;
  s.ping().await.unwrap();
}
