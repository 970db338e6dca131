//! Router-level tests: title records, image assets and the upstream proxy.

use axum::{
  body::Body,
  extract::Query,
  http::{header, Request, StatusCode},
  routing::get,
  Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::util::ServiceExt;
use unitygate_core::config::Config;
use unitygate_server::{build_router, AppState};

const UPSTREAM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:live="http://www.live.com/marketplace">
  <live:totalItems>1</live:totalItems>
  <entry live:itemNum="1">
    <id>urn:uuid:66acd000-77fe-1000-9115-d802584111f9</id>
    <title>Halo 3</title>
    <live:media>
      <live:mediaType>1</live:mediaType>
      <live:fullTitle>Halo 3</live:fullTitle>
      <live:reducedTitle>Halo 3</live:reducedTitle>
      <live:gameReducedTitle>Halo 3</live:gameReducedTitle>
      <live:titleId>1297287142</live:titleId>
    </live:media>
  </entry>
</feed>"#;

struct TestDataset {
  dir: TempDir,
}

impl TestDataset {
  fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["json", "boxart", "boxartfront", "boxartsm"] {
      std::fs::create_dir_all(dir.path().join(sub)).unwrap();
    }
    Self { dir }
  }

  fn write(&self, rel: &str, contents: &[u8]) -> &Self {
    std::fs::write(self.dir.path().join(rel), contents).unwrap();
    self
  }

  fn path(&self) -> &Path {
    self.dir.path()
  }
}

fn setup_app(dataset: &TestDataset, upstream_authority: &str) -> Router {
  let config = Config {
    data_dir: dataset.path().to_string_lossy().into_owned(),
    upstream_authority: upstream_authority.to_string(),
    upstream_timeout_secs: 5,
    ..Config::default()
  };
  build_router(AppState::new(config).unwrap())
}

/// Serve a small fake catalog on an ephemeral local port.
async fn spawn_upstream() -> String {
  let app = Router::new()
    .route(
      "/Catalog/Catalog.asmx/Query",
      get(|| async { ([(header::CONTENT_TYPE, "application/atom+xml")], UPSTREAM_FEED) }),
    )
    .route(
      "/echo",
      get(|Query(params): Query<HashMap<String, String>>| async move {
        format!(
          "<echo><game>{}</game><locale>{}</locale></echo>",
          params.get("game").cloned().unwrap_or_default(),
          params.get("locale").cloned().unwrap_or_default()
        )
      }),
    )
    .route("/broken", get(|| async { "<feed><entry>" }))
    .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "<error/>") }));

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  addr.to_string()
}

fn get_request(uri: &str) -> Request<Body> {
  Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
  axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec()
}

async fn body_json(body: Body) -> Value {
  serde_json::from_slice(&body_bytes(body).await).unwrap()
}

async fn body_text(body: Body) -> String {
  String::from_utf8(body_bytes(body).await).unwrap()
}

// ============================================================================
// Title records
// ============================================================================

#[tokio::test]
async fn test_direct_title_record_is_sanitized() {
  let dataset = TestDataset::new();
  dataset.write(
    "json/ABCD1234.json",
    br#"{"Title":"X","Url":"http://XboxUnity.net/x"}"#,
  );
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app.oneshot(get_request("/api/v2/Covers/ABCD1234")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(
    body_text(response.into_body()).await,
    r#"{"Title":"X","Url":"http://127.0.0.1/x"}"#
  );
}

#[tokio::test]
async fn test_trailing_segments_are_ignored() {
  let dataset = TestDataset::new();
  dataset.write("json/ABCD1234.json", br#"{"Title":"X"}"#);
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app
    .oneshot(get_request("/api/v2/Covers/ABCD1234/extra/stuff"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(body_json(response.into_body()).await, json!({"Title": "X"}));
}

#[tokio::test]
async fn test_homebrew_fallback() {
  let dataset = TestDataset::new();
  dataset
    .write(
      "json/Homebrew.json",
      br#"{"Items":[
        {"HBTitleID":"HB000001","TitleID":"FFED0001"},
        {"HBTitleID":"HB000002","TitleID":"FFED0002","Name":"Only here"}
      ]}"#,
    )
    .write("json/FFED0001.json", br#"[{"url":"http://XboxUnity.net/c/1"}]"#);
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app
    .clone()
    .oneshot(get_request("/api/v2/Covers/hb000001"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(
    body_json(response.into_body()).await,
    json!([{"url": "http://127.0.0.1/c/1"}])
  );

  let response = app.oneshot(get_request("/api/v2/Covers/HB000002")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let body = body_json(response.into_body()).await;
  assert_eq!(body["Name"], "Only here");
  assert_eq!(body["HBTitleID"], "HB000002");
}

#[tokio::test]
async fn test_unknown_title_is_404_with_searched_id() {
  let dataset = TestDataset::new();
  dataset.write("json/Homebrew.json", b"[]");
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app
    .oneshot(get_request("/api/v2/Covers/Some%20Game"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
  assert_eq!(
    body_json(response.into_body()).await,
    json!({"error": "HBTitleID not found", "searchedId": "Some Game"})
  );
}

#[tokio::test]
async fn test_missing_catalog_is_opaque_500() {
  let dataset = TestDataset::new();
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app.oneshot(get_request("/api/v2/Covers/NOPE0000")).await.unwrap();
  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = body_json(response.into_body()).await;
  assert_eq!(body, json!({"error": "Failed to process Homebrew.json"}));
}

#[tokio::test]
async fn test_corrupt_record_is_parse_failure() {
  let dataset = TestDataset::new();
  dataset.write("json/BROKEN01.json", b"{\"Title\": ");
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app.oneshot(get_request("/api/v2/Covers/BROKEN01")).await.unwrap();
  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body_json(response.into_body()).await, json!({"error": "parse failed"}));
}

#[tokio::test]
async fn test_encoded_traversal_is_not_found() {
  let dataset = TestDataset::new();
  dataset.write("json/Homebrew.json", b"[]");
  std::fs::write(dataset.path().join("secret.json"), br#"{"leak":true}"#).unwrap();
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app
    .oneshot(get_request("/api/v2/Covers/..%5Csecret"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_undecodable_title_path_is_opaque_500() {
  let dataset = TestDataset::new();
  dataset.write("json/Homebrew.json", b"[]");
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app
    .oneshot(get_request("/api/v2/Covers/%FF"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body_json(response.into_body()).await, json!({"error": "unexpected error"}));
}

// ============================================================================
// Image assets
// ============================================================================

#[tokio::test]
async fn test_images_are_served_from_each_kind() {
  let dataset = TestDataset::new();
  dataset
    .write("boxart/42.png", b"\x89PNG-large")
    .write("boxartfront/42.png", b"\x89PNG-front")
    .write("boxartsm/42.png", b"\x89PNG-small");
  let app = setup_app(&dataset, "127.0.0.1:9");

  for (kind, bytes) in [
    ("boxart", &b"\x89PNG-large"[..]),
    ("boxartfront", &b"\x89PNG-front"[..]),
    ("boxartsm", &b"\x89PNG-small"[..]),
  ] {
    let response = app
      .clone()
      .oneshot(get_request(&format!("/api/{}/42", kind)))
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(response.into_body()).await, bytes);
  }
}

#[tokio::test]
async fn test_missing_image_is_404() {
  let dataset = TestDataset::new();
  let app = setup_app(&dataset, "127.0.0.1:9");

  let response = app.oneshot(get_request("/api/boxart/42")).await.unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
  assert_eq!(body_json(response.into_body()).await, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_non_image_paths_fall_through_to_proxy() {
  let dataset = TestDataset::new();
  dataset.write("boxart/42.png", b"png");
  let upstream = spawn_upstream().await;
  let app = setup_app(&dataset, &upstream);

  for uri in ["/api/boxart/abc", "/api/boxartlg/42"] {
    let response = app.clone().oneshot(get_request(uri)).await.unwrap();
    // The fake upstream has no such path, so the proxy reports a failure.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
    assert_eq!(body_text(response.into_body()).await, "Internal Server Error");
  }
}

// ============================================================================
// Upstream proxy
// ============================================================================

#[tokio::test]
async fn test_proxy_strips_title_fields() {
  let dataset = TestDataset::new();
  let upstream = spawn_upstream().await;
  let app = setup_app(&dataset, &upstream);

  let response = app
    .oneshot(get_request("/Catalog/Catalog.asmx/Query?methodName=FindGames"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");

  let xml = body_text(response.into_body()).await;
  assert!(!xml.contains("Halo 3"), "{}", xml);
  assert!(xml.contains("<live:titleId>1297287142</live:titleId>"));
  assert!(xml.contains("<live:mediaType>1</live:mediaType>"));
  assert!(xml.contains("<id>urn:uuid:66acd000-77fe-1000-9115-d802584111f9</id>"));
}

#[tokio::test]
async fn test_proxy_passes_query_through() {
  let dataset = TestDataset::new();
  let upstream = spawn_upstream().await;
  let app = setup_app(&dataset, &upstream);

  let response = app
    .oneshot(get_request("/echo?game=halo&locale=en-US"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let xml = body_text(response.into_body()).await;
  assert!(xml.contains("<game>halo</game>"));
  assert!(xml.contains("<locale>en-US</locale>"));
}

#[tokio::test]
async fn test_proxy_failures_are_plain_500() {
  let dataset = TestDataset::new();
  let upstream = spawn_upstream().await;
  let app = setup_app(&dataset, &upstream);

  for uri in ["/broken", "/missing"] {
    let response = app.clone().oneshot(get_request(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
    assert_eq!(body_text(response.into_body()).await, "Internal Server Error");
  }
}

#[tokio::test]
async fn test_unreachable_upstream_is_500() {
  let dataset = TestDataset::new();
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let closed = listener.local_addr().unwrap().to_string();
  drop(listener);
  let app = setup_app(&dataset, &closed);

  let response = app.oneshot(get_request("/anything")).await.unwrap();
  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_non_get_fallback_is_404() {
  let dataset = TestDataset::new();
  let app = setup_app(&dataset, "127.0.0.1:9");

  let request = Request::builder()
    .method("POST")
    .uri("/Catalog/Catalog.asmx/Query")
    .body(Body::empty())
    .unwrap();
  let response = app.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cross-origin policy
// ============================================================================

#[tokio::test]
async fn test_cors_allows_any_origin() {
  let dataset = TestDataset::new();
  let app = setup_app(&dataset, "127.0.0.1:9");

  let request = Request::builder()
    .method("GET")
    .uri("/api/boxart/1")
    .header(header::ORIGIN, "http://example.com")
    .body(Body::empty())
    .unwrap();
  let response = app.oneshot(request).await.unwrap();
  assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
