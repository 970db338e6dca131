use axum::{
  extract::{rejection::PathRejection, Path, State},
  http::StatusCode,
  response::Json,
  routing::get,
  Router,
};
use serde_json::Value;

use unitygate_core::error::GatewayError;
use unitygate_core::resolver::{resolve, title_id_from_path};
use crate::routes::json_error;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
  Router::new().route("/api/v2/Covers/{*tid}", get(covers))
}

async fn covers(
  State(state): State<AppState>,
  captured: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
  let Path(captured) = captured.map_err(|rejection| {
    tracing::error!("Undecodable title path: {}", rejection.body_text());
    json_error(&GatewayError::Unexpected(rejection.body_text()))
  })?;
  let title_id = title_id_from_path(&captured);

  resolve(&state.store, &state.sanitizer, title_id)
    .await
    .map(Json)
    .map_err(|e| {
      match &e {
        GatewayError::NotFound { .. } => tracing::info!("Title {} not found", title_id),
        _ => tracing::error!("Title lookup error for {}: {}", title_id, e),
      }
      json_error(&e)
    })
}
