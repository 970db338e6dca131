use serde_json::{json, Value};
use thiserror::Error;

/// Failures of the title and proxy pipelines. String payloads are for the log only.
#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("Title not found: {searched_id}")]
  NotFound { searched_id: String },

  #[error("Homebrew catalog unavailable: {0}")]
  Storage(String),

  #[error("Malformed title record: {0}")]
  MalformedData(String),

  #[error("Upstream request failed: {0}")]
  Upstream(String),

  #[error("Malformed upstream document: {0}")]
  MalformedUpstream(String),

  #[error("Unexpected failure: {0}")]
  Unexpected(String),
}

impl GatewayError {
  pub fn status_code(&self) -> u16 {
    match self {
      GatewayError::NotFound { .. } => 404,
      _ => 500,
    }
  }

  /// Client-facing JSON body. Never carries internal detail.
  pub fn body(&self) -> Value {
    match self {
      GatewayError::NotFound { searched_id } => json!({
        "error": "HBTitleID not found",
        "searchedId": searched_id,
      }),
      GatewayError::Storage(_) => json!({"error": "Failed to process Homebrew.json"}),
      GatewayError::MalformedData(_) => json!({"error": "parse failed"}),
      _ => json!({"error": "unexpected error"}),
    }
  }
}
