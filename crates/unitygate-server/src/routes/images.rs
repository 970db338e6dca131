use axum::{
  body::Body,
  extract::{Path, State},
  http::{header, StatusCode, Uri},
  response::{IntoResponse, Json, Response},
  routing::get,
  Router,
};
use tokio_util::io::ReaderStream;

use unitygate_core::assets::{asset_file_name, parse_asset_id, ImageKind};
use crate::routes::proxy;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
  Router::new().route("/api/{kind}/{id}", get(image))
}

/// Serve `<data>/<kind>/<id>.png`. Paths that are not a known kind plus a
/// numeric id are not image requests and go to the upstream proxy instead.
async fn image(
  State(state): State<AppState>,
  Path((kind, id)): Path<(String, String)>,
  uri: Uri,
) -> Response {
  let (Some(kind), Some(id)) = (ImageKind::from_segment(&kind), parse_asset_id(&id)) else {
    return proxy::forward(&state, &uri).await;
  };

  let path = std::path::Path::new(&state.config.image_dir(kind)).join(asset_file_name(id));

  let file = match tokio::fs::File::open(&path).await {
    Ok(f) => f,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return not_found(),
    Err(e) => return internal_error(&path, e),
  };

  let metadata = match file.metadata().await {
    Ok(m) if m.is_file() => m,
    Ok(_) => return not_found(),
    Err(e) => return internal_error(&path, e),
  };

  let stream = ReaderStream::new(file);
  let body = Body::from_stream(stream);

  (
    [
      (header::CONTENT_TYPE, "image/png".to_string()),
      (header::CONTENT_LENGTH, metadata.len().to_string()),
    ],
    body,
  )
    .into_response()
}

fn not_found() -> Response {
  (
    StatusCode::NOT_FOUND,
    Json(serde_json::json!({"error": "not found"})),
  )
    .into_response()
}

fn internal_error(path: &std::path::Path, e: std::io::Error) -> Response {
  tracing::error!("Image read error for {}: {}", path.display(), e);
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(serde_json::json!({"error": "internal server error"})),
  )
    .into_response()
}
