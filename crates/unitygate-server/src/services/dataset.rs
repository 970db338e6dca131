use std::path::PathBuf;
use unitygate_core::storage::{record_file_name, TitleStore};

const HOMEBREW_FILE: &str = "Homebrew.json";

/// Title dataset backed by `<data>/json` on local disk.
#[derive(Debug, Clone)]
pub struct FsTitleStore {
  json_dir: PathBuf,
}

impl FsTitleStore {
  pub fn new(json_dir: impl Into<PathBuf>) -> Self {
    Self {
      json_dir: json_dir.into(),
    }
  }
}

impl TitleStore for FsTitleStore {
  async fn read_record(&self, title_id: &str) -> Option<String> {
    let path = self.json_dir.join(record_file_name(title_id)?);
    tokio::fs::read_to_string(&path).await.ok()
  }

  async fn read_homebrew(&self) -> Result<String, String> {
    let path = self.json_dir.join(HOMEBREW_FILE);
    tokio::fs::read_to_string(&path)
      .await
      .map_err(|e| format!("{}: {}", path.display(), e))
  }
}
