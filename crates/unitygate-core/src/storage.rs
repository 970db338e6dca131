/// Read-only title dataset (platform-specific implementation).
pub trait TitleStore: Send + Sync {
  /// Raw text of `<title_id>.json`, or `None` if it is absent or unreadable.
  fn read_record(
    &self,
    title_id: &str,
  ) -> impl std::future::Future<Output = Option<String>> + Send;

  /// Raw text of the homebrew catalog.
  fn read_homebrew(&self) -> impl std::future::Future<Output = Result<String, String>> + Send;
}

/// File name of the record for `title_id`, or `None` if the id cannot name a
/// file directly inside the dataset directory.
pub fn record_file_name(title_id: &str) -> Option<String> {
  if title_id.is_empty()
    || title_id == "."
    || title_id == ".."
    || title_id.contains(['/', '\\', '\0'])
  {
    return None;
  }
  Some(format!("{}.json", title_id))
}
