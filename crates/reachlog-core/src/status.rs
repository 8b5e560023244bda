//! The prospect lifecycle status.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Where a prospect sits in the outreach lifecycle.
///
/// Variants are declared in typical progression order, which is also the
/// derived `Ord`. The order is not a strict state machine: a later event may
/// move a prospect "backwards".
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProspectStatus {
  #[default]
  Qualified,
  ConnectionSent,
  Connected,
  Expired,
  Blacklisted,
}

impl ProspectStatus {
  /// The string stored in the `status` column and used on the wire.
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a status string, rejecting anything outside the enumeration.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }

  /// Whether a connection request has gone out for a prospect in this status.
  /// These are the statuses counted in the acceptance-rate denominator.
  pub fn is_contacted(self) -> bool {
    matches!(self, Self::ConnectionSent | Self::Connected | Self::Expired)
  }
}
