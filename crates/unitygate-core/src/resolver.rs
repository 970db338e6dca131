use serde_json::Value;

use crate::error::GatewayError;
use crate::homebrew::{canonical_title_id, find_entry, normalize_catalog};
use crate::sanitize::TextSanitizer;
use crate::storage::{record_file_name, TitleStore};

/// Title id from the captured path tail: everything after the first `/` is dropped.
pub fn title_id_from_path(captured: &str) -> &str {
  captured.split('/').next().unwrap_or_default()
}

/// Resolve a title id to its record.
///
/// Order: `<id>.json`, then the homebrew catalog entry matching `HBTitleID`
/// (case-insensitive), which yields `<TitleID>.json` when present or the
/// entry itself otherwise. The raw text is sanitized before it is parsed.
pub async fn resolve<S: TitleStore>(
  store: &S,
  sanitizer: &TextSanitizer,
  title_id: &str,
) -> Result<Value, GatewayError> {
  let raw = match read_record(store, title_id).await {
    Some(raw) => raw,
    None => resolve_homebrew(store, title_id).await?,
  };

  let sanitized = sanitizer.sanitize(&raw);
  serde_json::from_str(&sanitized).map_err(|e| GatewayError::MalformedData(e.to_string()))
}

async fn read_record<S: TitleStore>(store: &S, title_id: &str) -> Option<String> {
  record_file_name(title_id)?;
  store.read_record(title_id).await
}

async fn resolve_homebrew<S: TitleStore>(
  store: &S,
  title_id: &str,
) -> Result<String, GatewayError> {
  let data = store.read_homebrew().await.map_err(GatewayError::Storage)?;
  let catalog: Value =
    serde_json::from_str(&data).map_err(|e| GatewayError::Storage(e.to_string()))?;
  let entries = normalize_catalog(catalog).map_err(GatewayError::Storage)?;

  let found = find_entry(&entries, title_id).ok_or_else(|| GatewayError::NotFound {
    searched_id: title_id.to_string(),
  })?;

  if let Some(canonical) = canonical_title_id(found) {
    if let Some(raw) = read_record(store, &canonical).await {
      return Ok(raw);
    }
  }

  // Homebrew-only titles are served as the bare catalog entry.
  serde_json::to_string(found).map_err(|e| GatewayError::Unexpected(e.to_string()))
}
