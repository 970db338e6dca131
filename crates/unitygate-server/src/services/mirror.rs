use futures_util::StreamExt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use unitygate_core::assets::ImageKind;
use unitygate_core::config::Config;
use unitygate_core::mirror::{cover_file_name, covers_url, CoverDownload, CoverPlan};
use unitygate_core::storage::record_file_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
  Done,
  Skipped,
  Failed,
}

/// Per-run counters reported by the mirror commands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorSummary {
  pub done: usize,
  pub skipped: usize,
  pub failed: usize,
}

impl MirrorSummary {
  fn record(&mut self, outcome: Outcome) {
    match outcome {
      Outcome::Done => self.done += 1,
      Outcome::Skipped => self.skipped += 1,
      Outcome::Failed => self.failed += 1,
    }
  }
}

/// Fetch `/api/v2/Covers/<id>` for every title and store the JSON bodies under `json_dir`.
pub async fn fetch_records(
  client: &reqwest::Client,
  config: &Config,
  title_ids: Vec<String>,
) -> Result<MirrorSummary, String> {
  let json_dir = PathBuf::from(config.json_dir());
  tokio::fs::create_dir_all(&json_dir)
    .await
    .map_err(|e| format!("Failed to create {}: {}", json_dir.display(), e))?;
  let json_dir = json_dir.as_path();

  let total = title_ids.len();
  let mut summary = MirrorSummary::default();
  let mut results = futures_util::stream::iter(title_ids)
    .map(|title_id| async move {
      fetch_record(client, &config.mirror_base_url, json_dir, &title_id).await
    })
    .buffer_unordered(config.mirror_concurrency);

  while let Some(outcome) = results.next().await {
    summary.record(outcome);
    let finished = summary.done + summary.skipped + summary.failed;
    if finished % 100 == 0 || finished == total {
      tracing::info!("Records: {}/{}", finished, total);
    }
  }
  Ok(summary)
}

async fn fetch_record(
  client: &reqwest::Client,
  base_url: &str,
  json_dir: &Path,
  title_id: &str,
) -> Outcome {
  let Some(file_name) = record_file_name(title_id) else {
    tracing::warn!("Skipping unusable TitleID {:?}", title_id);
    return Outcome::Skipped;
  };

  let resp = match client.get(covers_url(base_url, title_id)).send().await {
    Ok(r) => r,
    Err(e) => {
      tracing::error!("Request failed, TitleID: {}, error: {}", title_id, e);
      return Outcome::Failed;
    }
  };

  if !resp.status().is_success() {
    tracing::error!("Request failed, TitleID: {}, status: {}", title_id, resp.status().as_u16());
    return Outcome::Failed;
  }

  let record: Value = match resp.json().await {
    Ok(v) => v,
    Err(e) => {
      tracing::error!("Invalid JSON, TitleID: {}, error: {}", title_id, e);
      return Outcome::Failed;
    }
  };

  let data = match serde_json::to_string_pretty(&record) {
    Ok(d) => d,
    Err(e) => {
      tracing::error!("Serialize failed, TitleID: {}, error: {}", title_id, e);
      return Outcome::Failed;
    }
  };

  if let Err(e) = tokio::fs::write(json_dir.join(file_name), data).await {
    tracing::error!("Write failed, TitleID: {}, error: {}", title_id, e);
    return Outcome::Failed;
  }
  Outcome::Done
}

/// Build the cover download plan from every record in `json_dir`.
pub async fn plan_covers(json_dir: &Path) -> Result<CoverPlan, String> {
  let mut entries = tokio::fs::read_dir(json_dir)
    .await
    .map_err(|e| format!("Failed to read {}: {}", json_dir.display(), e))?;

  let mut plan = CoverPlan::default();
  while let Some(entry) = entries.next_entry().await.map_err(|e| e.to_string())? {
    let path = entry.path();
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
      continue;
    }

    let record: Value = match tokio::fs::read_to_string(&path)
      .await
      .map_err(|e| e.to_string())
      .and_then(|data| serde_json::from_str(&data).map_err(|e| e.to_string()))
    {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!("Error processing {}: {}", path.display(), e);
        continue;
      }
    };

    if is_empty_record(&record) {
      tracing::debug!("Skipping empty file: {}", path.display());
      continue;
    }
    plan.add_record(&record);
  }
  Ok(plan)
}

fn is_empty_record(record: &Value) -> bool {
  match record {
    Value::Null => true,
    Value::Array(items) => items.is_empty(),
    Value::Object(map) => map.is_empty(),
    Value::String(s) => s.is_empty(),
    _ => false,
  }
}

/// Download every planned cover that is not already on disk.
pub async fn download_covers(
  client: &reqwest::Client,
  config: &Config,
  plan: &CoverPlan,
) -> Result<MirrorSummary, String> {
  for kind in ImageKind::ALL {
    let dir = config.image_dir(kind);
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(|e| format!("Failed to create {}: {}", dir, e))?;
  }

  let total = plan.len();
  let mut summary = MirrorSummary::default();
  let mut results = futures_util::stream::iter(plan.downloads())
    .map(|download| download_cover(client, config, download))
    .buffer_unordered(config.mirror_concurrency);

  while let Some(outcome) = results.next().await {
    summary.record(outcome);
    let finished = summary.done + summary.skipped + summary.failed;
    if finished % 100 == 0 || finished == total {
      tracing::info!("Covers: {}/{}", finished, total);
    }
  }
  Ok(summary)
}

async fn download_cover(client: &reqwest::Client, config: &Config, download: &CoverDownload) -> Outcome {
  let Some(file_name) = cover_file_name(&download.url) else {
    tracing::warn!("Skipping cover with no file name: {}", download.url);
    return Outcome::Skipped;
  };
  let path = Path::new(&config.image_dir(download.kind)).join(file_name);

  if tokio::fs::try_exists(&path).await.unwrap_or(false) {
    return Outcome::Skipped;
  }

  match stream_to_file(client, &download.url, &path).await {
    Ok(()) => Outcome::Done,
    Err(e) => {
      tracing::error!("Error downloading {}: {}", download.url, e);
      let _ = tokio::fs::remove_file(&path).await;
      Outcome::Failed
    }
  }
}

async fn stream_to_file(client: &reqwest::Client, url: &str, path: &Path) -> Result<(), String> {
  let resp = client.get(url).send().await.map_err(|e| format!("HTTP error: {}", e))?;
  if !resp.status().is_success() {
    return Err(format!(
      "HTTP {}: {}",
      resp.status().as_u16(),
      resp.status().canonical_reason().unwrap_or("Unknown")
    ));
  }

  let mut file = tokio::fs::File::create(path)
    .await
    .map_err(|e| format!("File create error: {}", e))?;

  let mut stream = resp.bytes_stream();
  while let Some(chunk) = stream.next().await {
    let bytes = chunk.map_err(|e| format!("Download error: {}", e))?;
    file
      .write_all(&bytes)
      .await
      .map_err(|e| format!("Write error: {}", e))?;
  }
  file.flush().await.map_err(|e| format!("Write error: {}", e))
}
