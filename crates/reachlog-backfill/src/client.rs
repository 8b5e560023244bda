//! Async HTTP client for the Heyreach public API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde_json::Value;

/// Leads requested per page; a shorter page marks the end of the campaign.
pub const PAGE_SIZE: usize = 100;

/// Connection settings for the Heyreach API.
#[derive(Debug, Clone)]
pub struct HeyreachConfig {
  pub base_url: String,
  pub api_key:  String,
}

/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HeyreachClient {
  client: Client,
  config: HeyreachConfig,
}

impl HeyreachClient {
  pub fn new(config: HeyreachConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `GET /campaign/GetLeadsForCampaign?campaignId=..&page=..&limit=..`
  pub async fn campaign_leads_page(
    &self,
    campaign_id: &str,
    page: u64,
  ) -> Result<Value> {
    tracing::info!(campaign_id, page, "fetching campaign leads");

    let resp = self
      .client
      .get(self.url("/campaign/GetLeadsForCampaign"))
      .header("X-API-KEY", &self.config.api_key)
      .header(reqwest::header::ACCEPT, "application/json")
      .query(&[
        ("campaignId", campaign_id.to_string()),
        ("page", page.to_string()),
        ("limit", PAGE_SIZE.to_string()),
      ])
      .send()
      .await
      .context("GET /campaign/GetLeadsForCampaign failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /campaign/GetLeadsForCampaign → {}", resp.status()));
    }
    resp.json().await.context("deserialising campaign leads")
  }

  /// Fetch every lead in a campaign, following pagination.
  pub async fn all_campaign_leads(&self, campaign_id: &str) -> Result<Vec<Value>> {
    let mut leads = Vec::new();
    let mut page = 1;

    loop {
      let body = self.campaign_leads_page(campaign_id, page).await?;
      let LeadPage { leads: batch, total_pages } = LeadPage::from_response(body);
      if batch.is_empty() {
        break;
      }

      let fetched = batch.len();
      leads.extend(batch);
      tracing::info!(page, fetched, "fetched leads");

      if !has_more(page, fetched, total_pages) {
        break;
      }
      page += 1;
    }

    tracing::info!(total = leads.len(), "fetched all campaign leads");
    Ok(leads)
  }
}

// ─── Response shape ──────────────────────────────────────────────────────────

/// One page of leads. The API has returned both `leads` and `data` arrays,
/// and both `totalPages` and `total_pages`.
#[derive(Debug, Default)]
pub struct LeadPage {
  pub leads:       Vec<Value>,
  pub total_pages: Option<u64>,
}

impl LeadPage {
  pub fn from_response(mut body: Value) -> Self {
    let leads = ["leads", "data"]
      .into_iter()
      .find_map(|key| match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
      })
      .unwrap_or_default();

    let total_pages = body
      .get("totalPages")
      .or_else(|| body.get("total_pages"))
      .and_then(Value::as_u64)
      .filter(|&n| n > 0);

    Self { leads, total_pages }
  }
}

/// Whether another page should be requested after `page` returned `fetched`
/// leads.
pub fn has_more(page: u64, fetched: usize, total_pages: Option<u64>) -> bool {
  match total_pages {
    Some(total) if page >= total => false,
    _ => fetched >= PAGE_SIZE,
  }
}
