use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use unitygate_core::config::Config;
use unitygate_core::mirror::CatalogIndex;
use unitygate_server::services::mirror::{self, MirrorSummary};

const COVER_TIMEOUT_SECS: u64 = 10;

/// Populate the local dataset from the vendor catalog.
#[derive(Parser)]
#[command(name = "unitygate-mirror", version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Download the title record of every item in an index file.
  Records {
    /// Index document with an `Items` array of `{ "TitleID": ... }` objects.
    #[arg(long, default_value = "allitem.json")]
    index: PathBuf,
  },
  /// Download the cover images referenced by the stored title records.
  Covers,
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let cli = Cli::parse();
  let config = Config::from_env();

  match run(cli.command, &config).await {
    Ok(summary) => tracing::info!(
      "Finished: {} done, {} skipped, {} failed",
      summary.done,
      summary.skipped,
      summary.failed
    ),
    Err(e) => {
      tracing::error!("{}", e);
      std::process::exit(1);
    }
  }
}

async fn run(command: Command, config: &Config) -> Result<MirrorSummary, String> {
  config.validate()?;

  match command {
    Command::Records { index } => {
      let data = tokio::fs::read_to_string(&index)
        .await
        .map_err(|e| format!("Failed to read {}: {}", index.display(), e))?;
      let index: CatalogIndex =
        serde_json::from_str(&data).map_err(|e| format!("Invalid index file: {}", e))?;
      let title_ids = index.title_ids();
      tracing::info!("Fetching {} title records", title_ids.len());

      let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()
        .map_err(|e| format!("Client error: {}", e))?;
      mirror::fetch_records(&client, config, title_ids).await
    }
    Command::Covers => {
      let plan = mirror::plan_covers(std::path::Path::new(&config.json_dir())).await?;
      tracing::info!("Total unique download tasks: {}", plan.len());

      let duplicates = plan.duplicates();
      if duplicates.is_empty() {
        tracing::info!("No duplicate URLs found");
      }
      for (url, count) in duplicates {
        tracing::info!("Duplicate URL {}: {} times", url, count);
      }

      let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(COVER_TIMEOUT_SECS))
        .build()
        .map_err(|e| format!("Client error: {}", e))?;
      mirror::download_covers(&client, config, &plan).await
    }
  }
}
