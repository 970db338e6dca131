use crate::assets::ImageKind;
use crate::sanitize::TextSanitizer;

/// Gateway configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub data_dir: String,
  /// Host (and optional port) of the proxied catalog service.
  pub upstream_authority: String,
  pub upstream_timeout_secs: u64,
  /// Literal text rewritten out of title records.
  pub vendor_domain: String,
  pub replace_text: String,
  pub mirror_base_url: String,
  pub mirror_concurrency: usize,
}

impl Config {
  pub fn from_env() -> Self {
    let defaults = Self::default();
    Self {
      port: env_parse("PORT").unwrap_or(defaults.port),
      data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
      upstream_authority: std::env::var("UPSTREAM_AUTHORITY")
        .unwrap_or(defaults.upstream_authority),
      upstream_timeout_secs: env_parse("UPSTREAM_TIMEOUT_SECS")
        .unwrap_or(defaults.upstream_timeout_secs),
      vendor_domain: std::env::var("VENDOR_DOMAIN").unwrap_or(defaults.vendor_domain),
      replace_text: std::env::var("REPLACE_TEXT").unwrap_or(defaults.replace_text),
      mirror_base_url: std::env::var("MIRROR_BASE_URL").unwrap_or(defaults.mirror_base_url),
      mirror_concurrency: env_parse("MIRROR_CONCURRENCY").unwrap_or(defaults.mirror_concurrency),
    }
  }

  /// Reject settings the gateway cannot run with.
  pub fn validate(&self) -> Result<(), String> {
    if self.vendor_domain.is_empty() {
      return Err("VENDOR_DOMAIN must not be empty".into());
    }
    if !TextSanitizer::from_config(self).is_idempotent() {
      return Err("REPLACE_TEXT must not be empty or overlap VENDOR_DOMAIN".into());
    }
    if self.upstream_authority.is_empty() {
      return Err("UPSTREAM_AUTHORITY must not be empty".into());
    }
    if self.upstream_timeout_secs == 0 {
      return Err("UPSTREAM_TIMEOUT_SECS must be greater than zero".into());
    }
    if self.mirror_concurrency == 0 {
      return Err("MIRROR_CONCURRENCY must be greater than zero".into());
    }
    Ok(())
  }

  pub fn json_dir(&self) -> String {
    format!("{}/json", self.data_dir)
  }

  pub fn homebrew_file(&self) -> String {
    format!("{}/Homebrew.json", self.json_dir())
  }

  pub fn image_dir(&self, kind: ImageKind) -> String {
    format!("{}/{}", self.data_dir, kind.dir_name())
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: 80,
      data_dir: "./data".into(),
      upstream_authority: "catalog.xboxlive.com".into(),
      upstream_timeout_secs: 10,
      vendor_domain: "XboxUnity.net".into(),
      replace_text: "127.0.0.1".into(),
      mirror_base_url: "http://xboxunity.net".into(),
      mirror_concurrency: 32,
    }
  }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
  std::env::var(key).ok().and_then(|v| v.parse().ok())
}
