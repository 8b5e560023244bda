//! `backfill` — import accepted LinkedIn connections from the Heyreach API.
//!
//! # Usage
//!
//! ```
//! backfill --campaign-id 12345 --api-key $KEY --database ./prospects.db
//! backfill --config ~/.config/reachlog/backfill.toml --dry-run
//! ```

mod backfill;
mod client;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use client::{HeyreachClient, HeyreachConfig};
use reachlog_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_BASE_URL: &str = "https://api.heyreach.io/api/public";
const DEFAULT_DATABASE: &str = "./prospects.db";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "backfill", about = "Backfill accepted connections from Heyreach")]
struct Args {
  /// Path to a TOML config file (api_key, campaign_id, base_url, database_path).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Heyreach campaign to read leads from.
  #[arg(long, env = "HEYREACH_CAMPAIGN_ID")]
  campaign_id: Option<String>,

  /// Heyreach API key.
  #[arg(long, env = "HEYREACH_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Heyreach API base URL.
  #[arg(long, env = "HEYREACH_API_BASE_URL")]
  base_url: Option<String>,

  /// SQLite database to write into.
  #[arg(long, env = "REACHLOG_DATABASE_PATH")]
  database: Option<PathBuf>,

  /// Report what would be written without touching the database.
  #[arg(long)]
  dry_run: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  api_key:       String,
  #[serde(default)]
  campaign_id:   String,
  #[serde(default)]
  base_url:      String,
  #[serde(default)]
  database_path: String,
}

fn non_empty(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override the config file, which overrides defaults.
  let Some(api_key) = args.api_key.or_else(|| non_empty(&file_cfg.api_key)) else {
    bail!("no API key given; set HEYREACH_API_KEY or pass --api-key");
  };
  let Some(campaign_id) = args.campaign_id.or_else(|| non_empty(&file_cfg.campaign_id)) else {
    bail!("no campaign given; set HEYREACH_CAMPAIGN_ID or pass --campaign-id");
  };
  let base_url = args
    .base_url
    .or_else(|| non_empty(&file_cfg.base_url))
    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
  let database = args
    .database
    .or_else(|| non_empty(&file_cfg.database_path).map(PathBuf::from))
    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

  let client = HeyreachClient::new(HeyreachConfig { base_url, api_key })?;
  let leads = client.all_campaign_leads(&campaign_id).await?;

  let store = SqliteStore::open(&database)
    .await
    .with_context(|| format!("failed to open store at {}", database.display()))?;

  if args.dry_run {
    tracing::info!("dry run: no changes will be written");
  }
  let summary = backfill::run(&store, &leads, args.dry_run)
    .await
    .context("backfill failed")?;

  tracing::info!(
    total = summary.total,
    accepted = summary.accepted,
    backfilled = summary.backfilled,
    already_present = summary.already_present,
    skipped = summary.skipped,
    dry_run = args.dry_run,
    "backfill complete"
  );
  println!(
    "{} leads, {} accepted, {} {}, {} already connected, {} without profile URL",
    summary.total,
    summary.accepted,
    summary.backfilled,
    if args.dry_run { "would be backfilled" } else { "backfilled" },
    summary.already_present,
    summary.skipped,
  );

  Ok(())
}
