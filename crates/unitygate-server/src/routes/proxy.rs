use axum::{
  extract::State,
  http::{header, Method, StatusCode, Uri},
  response::{IntoResponse, Response},
};

use crate::services::upstream;
use crate::state::AppState;

/// Catch-all: forward GETs to the upstream catalog and strip title fields from the reply.
pub async fn fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
  if method != Method::GET {
    return (StatusCode::NOT_FOUND, "Not Found").into_response();
  }
  forward(&state, &uri).await
}

pub async fn forward(state: &AppState, uri: &Uri) -> Response {
  let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

  let result = upstream::fetch(&state.upstream, &state.config.upstream_authority, path_and_query)
    .await
    .and_then(|body| upstream::rewrite(&body));

  match result {
    Ok(xml) => (
      StatusCode::OK,
      [(header::CONTENT_TYPE, "application/xml")],
      xml,
    )
      .into_response(),
    Err(e) => {
      tracing::error!("Proxy error for {}: {}", path_and_query, e);
      (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
  }
}
