pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
  routes::api_router()
    .fallback(routes::proxy::fallback)
    .with_state(state)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}
