use std::time::Duration;
use unitygate_core::config::Config;
use unitygate_core::sanitize::TextSanitizer;

use crate::services::dataset::FsTitleStore;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
  pub config: Config,
  pub store: FsTitleStore,
  pub sanitizer: TextSanitizer,
  pub upstream: reqwest::Client,
}

impl AppState {
  pub fn new(config: Config) -> Result<Self, String> {
    config.validate()?;

    let upstream = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.upstream_timeout_secs))
      .build()
      .map_err(|e| format!("Failed to build upstream client: {}", e))?;

    Ok(Self {
      store: FsTitleStore::new(config.json_dir()),
      sanitizer: TextSanitizer::from_config(&config),
      upstream,
      config,
    })
  }
}
