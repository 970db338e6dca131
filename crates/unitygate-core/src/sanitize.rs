use crate::config::Config;

/// Literal, all-occurrences text replacement applied to raw title records.
#[derive(Debug, Clone)]
pub struct TextSanitizer {
  target: String,
  replacement: String,
}

impl TextSanitizer {
  pub fn new(target: impl Into<String>, replacement: impl Into<String>) -> Self {
    Self {
      target: target.into(),
      replacement: replacement.into(),
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.vendor_domain.clone(), config.replace_text.clone())
  }

  /// Whether a second pass can never find new matches. Any match in the output
  /// would have to overlap an inserted replacement, so it is enough that the
  /// replacement is non-empty, does not contain or sit inside the target, and
  /// shares no edge with it.
  pub fn is_idempotent(&self) -> bool {
    let (target, repl) = (self.target.as_str(), self.replacement.as_str());
    if target.is_empty() {
      return true;
    }
    if repl.is_empty() || repl.contains(target) || target.contains(repl) {
      return false;
    }
    let edge_overlap = repl
      .char_indices()
      .skip(1)
      .any(|(i, _)| target.starts_with(&repl[i..]) || target.ends_with(&repl[..i]));
    !edge_overlap
  }

  pub fn sanitize(&self, raw: &str) -> String {
    if self.target.is_empty() {
      return raw.to_string();
    }
    raw.replace(&self.target, &self.replacement)
  }
}
