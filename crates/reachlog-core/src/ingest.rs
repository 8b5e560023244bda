//! Turning a raw webhook body into a unit of ingestion work.
//!
//! Ingestion failures are never shown to the webhook sender; the transport
//! always answers with an [`Ack`]. The [`IngestFailure`] variants exist so the
//! receiving layer can log what went wrong.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{
  event::Event,
  prospect::{LeadAttributes, Prospect},
  webhook::WebhookPayload,
};

// ─── Ack ─────────────────────────────────────────────────────────────────────

/// The acknowledgment returned to the webhook sender for every delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
  pub status:  &'static str,
  pub message: &'static str,
}

impl Ack {
  pub const RECEIVED: Ack = Ack {
    status:  "success",
    message: "webhook received",
  };
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

/// Everything the store needs to resolve the prospect, apply the status rule
/// and log the event in a single transaction.
#[derive(Debug, Clone)]
pub struct Ingestion {
  pub profile_url: String,
  pub attributes:  LeadAttributes,
  pub event_type:  String,
  /// When the event happened upstream; stamps milestone timestamps.
  pub occurred_at: DateTime<Utc>,
  pub received_at: DateTime<Utc>,
  /// Raw JSON text, stored verbatim.
  pub payload:     String,
}

impl Ingestion {
  /// Parse a raw webhook body received at `received_at`.
  ///
  /// The payload `timestamp` becomes `occurred_at` when it is valid RFC 3339;
  /// otherwise the receive time is used.
  pub fn from_body(
    body: &[u8],
    received_at: DateTime<Utc>,
  ) -> Result<Self, IngestFailure> {
    let text = std::str::from_utf8(body)?;
    let payload: WebhookPayload = serde_json::from_str(text)?;

    let profile_url = payload.lead.profile_url().ok_or_else(|| {
      IngestFailure::MissingProfileUrl {
        event_type: payload.event.clone(),
      }
    })?;

    let occurred_at = payload
      .timestamp
      .as_deref()
      .and_then(|ts| DateTime::parse_from_rfc3339(ts.trim()).ok())
      .map(|dt| dt.with_timezone(&Utc))
      .unwrap_or(received_at);

    Ok(Self {
      profile_url,
      attributes: payload.lead.attributes(),
      event_type: payload.event,
      occurred_at,
      received_at,
      payload: text.to_owned(),
    })
  }
}

/// The result of a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct Ingested {
  pub prospect: Prospect,
  pub event:    Event,
}

// ─── Failure ─────────────────────────────────────────────────────────────────

/// Why an ingestion did not complete. Logged, never returned to the sender.
#[derive(Debug, Error)]
pub enum IngestFailure {
  #[error("request body could not be read: {0}")]
  UnreadableBody(String),

  #[error("body is not valid UTF-8: {0}")]
  InvalidUtf8(#[from] std::str::Utf8Error),

  #[error("body is not a valid webhook payload: {0}")]
  InvalidPayload(#[from] serde_json::Error),

  #[error("lead has no profile URL (event {event_type:?})")]
  MissingProfileUrl { event_type: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}
