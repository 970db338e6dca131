use unitygate_core::error::GatewayError;
use unitygate_core::strip::strip_titles;
use unitygate_core::xml::XmlDocument;

/// Target URL on the upstream catalog: path and query are passed through unchanged.
pub fn upstream_url(authority: &str, path_and_query: &str) -> String {
  format!("http://{}{}", authority, path_and_query)
}

/// GET the upstream document. Transport errors, timeouts and non-2xx statuses all fail.
pub async fn fetch(
  client: &reqwest::Client,
  authority: &str,
  path_and_query: &str,
) -> Result<String, GatewayError> {
  let url = upstream_url(authority, path_and_query);
  tracing::debug!("Forwarding to: {}", url);

  let resp = client
    .get(&url)
    .send()
    .await
    .map_err(|e| GatewayError::Upstream(e.to_string()))?;

  if !resp.status().is_success() {
    return Err(GatewayError::Upstream(format!("HTTP {} from {}", resp.status(), url)));
  }

  resp.text().await.map_err(|e| GatewayError::Upstream(e.to_string()))
}

/// Parse, strip title fields, and re-serialize an upstream document.
pub fn rewrite(body: &str) -> Result<String, GatewayError> {
  let mut doc = XmlDocument::parse(body)?;
  strip_titles(&mut doc);
  doc.to_xml()
}
