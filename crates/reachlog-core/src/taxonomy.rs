//! Event taxonomy and status rules.
//!
//! Maps an inbound event-type string to the status transition it causes.
//! Unknown event types are accepted everywhere; they are logged but leave the
//! prospect's status alone, so the upstream taxonomy can grow without breaking
//! ingestion.

use crate::status::ProspectStatus;

/// A connection request went out to the prospect.
pub const CONNECTION_REQUEST_SENT: &str = "connection_request_sent";

/// The prospect accepted a connection request.
pub const CONNECTION_REQUEST_ACCEPTED: &str = "connection_request_accepted";

/// Which timestamp column a transition stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
  ConnectionSent,
  ConnectionAccepted,
}

impl Milestone {
  /// The `prospects` column holding this milestone's timestamp.
  pub fn column(self) -> &'static str {
    match self {
      Self::ConnectionSent => "connection_sent_at",
      Self::ConnectionAccepted => "connection_accepted_at",
    }
  }
}

/// The effect of a status-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
  pub status:    ProspectStatus,
  /// Overwritten with the latest occurrence; a prospect may be re-targeted.
  pub milestone: Milestone,
}

/// Return the transition `event_type` causes, or `None` if it does not affect
/// status. Matching is exact and case-sensitive.
pub fn status_transition(event_type: &str) -> Option<StatusTransition> {
  match event_type {
    CONNECTION_REQUEST_SENT => Some(StatusTransition {
      status:    ProspectStatus::ConnectionSent,
      milestone: Milestone::ConnectionSent,
    }),
    CONNECTION_REQUEST_ACCEPTED => Some(StatusTransition {
      status:    ProspectStatus::Connected,
      milestone: Milestone::ConnectionAccepted,
    }),
    _ => None,
  }
}
