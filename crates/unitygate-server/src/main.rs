use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use unitygate_core::config::Config;
use unitygate_server::{build_router, AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

  let app_state = AppState::new(config.clone()).unwrap_or_else(|e| {
    tracing::error!("Invalid configuration: {}", e);
    std::process::exit(1);
  });

  let app = build_router(app_state);

  let listener = TcpListener::bind(addr).await.expect("Failed to bind");
  tracing::info!("Server listening on {}", addr);
  tracing::info!(
    "Data directory: {}",
    std::fs::canonicalize(&config.data_dir)
      .unwrap_or_else(|_| config.data_dir.clone().into())
      .display()
  );
  tracing::info!(
    "Proxying to http://{}, rewriting {} -> {}",
    config.upstream_authority,
    config.vendor_domain,
    config.replace_text
  );

  axum::serve(listener, app).await.expect("Server error");
}
