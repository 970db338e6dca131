pub mod covers;
pub mod images;
pub mod proxy;

use axum::{http::StatusCode, response::Json, Router};
use serde_json::Value;
use unitygate_core::error::GatewayError;

use crate::state::AppState;

/// Title and image routes. Everything else falls through to [`proxy::forward`].
pub fn api_router() -> Router<AppState> {
  Router::new()
    .merge(covers::router())
    .merge(images::router())
}

pub(crate) fn json_error(err: &GatewayError) -> (StatusCode, Json<Value>) {
  let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
  (status, Json(err.body()))
}
