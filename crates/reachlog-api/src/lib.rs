//! HTTP surface for reachlog.
//!
//! Exposes an axum [`Router`] backed by any [`reachlog_core::store::TrackerStore`]:
//! the Heyreach webhook receiver plus a read-only JSON query API.
//! TLS, tracing middleware and process concerns are the caller's
//! responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Banner |
//! | `GET`  | `/health` | Storage reachability |
//! | `POST` | `/webhooks/heyreach` | Always `200` + ack |
//! | `GET`  | `/stats` | Aggregate counts |
//! | `GET`  | `/prospects` | Paginated, optional `status` |
//! | `GET`  | `/prospects/{id}` | Detail with events |
//! | `GET`  | `/events` | Paginated, optional `event_type` |

pub mod error;
pub mod events;
pub mod health;
pub mod prospects;
pub mod stats;
pub mod webhooks;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use reachlog_core::store::TrackerStore;

pub use error::ApiError;

/// Build the application router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TrackerStore + 'static,
{
  Router::new()
    .route("/", get(health::index))
    .route("/health", get(health::check::<S>))
    // Ingestion
    .route("/webhooks/heyreach", post(webhooks::receive::<S>))
    // Query surface
    .route("/stats", get(stats::handler::<S>))
    .route("/prospects", get(prospects::list::<S>))
    .route("/prospects/{id}", get(prospects::get_one::<S>))
    .route("/events", get(events::list::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
