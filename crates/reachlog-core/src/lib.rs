//! Core types and trait definitions for reachlog.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the event taxonomy, the prospect and event models, the inbound webhook
//! payload model and the [`store::TrackerStore`] abstraction that storage
//! backends implement.

pub mod error;
pub mod event;
pub mod ingest;
pub mod prospect;
pub mod stats;
pub mod status;
pub mod store;
pub mod taxonomy;
pub mod webhook;

pub use error::{Error, Result};
