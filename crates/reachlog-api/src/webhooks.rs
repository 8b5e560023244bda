//! Handler for `POST /webhooks/heyreach`.
//!
//! Every delivery is answered with `200 OK` and an [`Ack`], whatever happened
//! internally. Heyreach retries non-2xx responses, so surfacing a failure
//! would turn one bad payload into a stream of duplicates. Failures are
//! logged with the raw body instead.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::BytesRejection};
use bytes::Bytes;
use chrono::Utc;
use reachlog_core::{
  ingest::{Ack, IngestFailure, Ingested, Ingestion},
  store::TrackerStore,
};

/// Parse `body` and ingest it atomically.
pub async fn process<S>(store: &S, body: &[u8]) -> Result<Ack, IngestFailure>
where
  S: TrackerStore,
{
  let ingestion = Ingestion::from_body(body, Utc::now())?;
  let Ingested { prospect, event } = store
    .ingest(ingestion)
    .await
    .map_err(|e| IngestFailure::Store(Box::new(e)))?;

  tracing::info!(
    prospect_id = prospect.id,
    event_id = event.id,
    event_type = %event.event_type,
    status = %prospect.status,
    "webhook processed"
  );
  Ok(Ack::RECEIVED)
}

/// `POST /webhooks/heyreach`
pub async fn receive<S>(
  State(store): State<Arc<S>>,
  body: Result<Bytes, BytesRejection>,
) -> Json<Ack>
where
  S: TrackerStore,
{
  let body = match body {
    Ok(body) => body,
    Err(rejection) => {
      log_failure(&IngestFailure::UnreadableBody(rejection.body_text()), b"");
      return Json(Ack::RECEIVED);
    }
  };

  tracing::debug!(body = %String::from_utf8_lossy(&body), "webhook received");

  match process(store.as_ref(), &body).await {
    Ok(ack) => Json(ack),
    Err(failure) => {
      log_failure(&failure, &body);
      Json(Ack::RECEIVED)
    }
  }
}

fn log_failure(failure: &IngestFailure, body: &[u8]) {
  let body = String::from_utf8_lossy(body);
  match failure {
    IngestFailure::Store(_) => {
      tracing::error!(error = %failure, %body, "webhook ingestion failed; acknowledging anyway")
    }
    _ => tracing::warn!(error = %failure, %body, "webhook rejected; acknowledging anyway"),
  }
}
