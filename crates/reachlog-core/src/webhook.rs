//! The inbound Heyreach webhook payload.
//!
//! Upstream has used several spellings for the same fields over time (and the
//! REST API's lead objects differ from the webhook's), so the model accepts
//! the known aliases. Anything not modelled here survives only
//! in the verbatim payload stored with the event.

use serde::{Deserialize, Deserializer};

use crate::prospect::{LeadAttributes, non_blank};

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
  #[serde(alias = "eventType", alias = "event_type")]
  pub event:     String,
  #[serde(default)]
  pub lead:      WebhookLead,
  #[serde(default)]
  pub campaign:  Option<WebhookCampaign>,
  /// ISO-8601 time the event happened upstream.
  #[serde(default)]
  pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLead {
  #[serde(default, alias = "leadId", deserialize_with = "string_or_number")]
  pub id:                    Option<String>,
  #[serde(default, alias = "first_name")]
  pub first_name:            Option<String>,
  #[serde(default, alias = "last_name")]
  pub last_name:             Option<String>,
  #[serde(default, alias = "companyName", alias = "company_name")]
  pub company:               Option<String>,
  #[serde(default, alias = "position")]
  pub title:                 Option<String>,
  #[serde(
    default,
    rename = "linkedInProfileUrl",
    alias = "profileUrl",
    alias = "profile_url"
  )]
  pub linked_in_profile_url: Option<String>,
  #[serde(default, alias = "emailAddress", alias = "email_address")]
  pub email:                 Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookCampaign {
  #[serde(default, deserialize_with = "string_or_number")]
  pub id:   Option<String>,
  #[serde(default)]
  pub name: Option<String>,
}

impl WebhookLead {
  /// The trimmed profile URL, if the lead carries a non-blank one.
  pub fn profile_url(&self) -> Option<String> {
    non_blank(self.linked_in_profile_url.clone())
  }

  pub fn attributes(&self) -> LeadAttributes {
    LeadAttributes {
      lead_id:    self.id.clone(),
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
      company:    self.company.clone(),
      title:      self.title.clone(),
      email:      self.email.clone(),
    }
    .normalized()
  }
}

/// Upstream ids arrive as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(
    match Option::<serde_json::Value>::deserialize(deserializer)? {
      Some(serde_json::Value::String(s)) => Some(s),
      Some(serde_json::Value::Number(n)) => Some(n.to_string()),
      _ => None,
    },
  )
}
