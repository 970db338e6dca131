//! Planning helpers for populating the dataset from the vendor service.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::assets::ImageKind;
use crate::homebrew::canonical_title_id;

/// Title index document (`allitem.json`).
#[derive(Debug, Deserialize)]
pub struct CatalogIndex {
  #[serde(rename = "Items", default)]
  pub items: Vec<Value>,
}

impl CatalogIndex {
  /// Title ids of all items, in index order. Items without a usable `TitleID` are skipped.
  pub fn title_ids(&self) -> Vec<String> {
    self.items.iter().filter_map(canonical_title_id).collect()
  }
}

pub fn covers_url(base_url: &str, title_id: &str) -> String {
  format!(
    "{}/api/v2/Covers/{}",
    base_url.trim_end_matches('/'),
    urlencoding::encode(title_id)
  )
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CoverDownload {
  pub url: String,
  pub kind: ImageKind,
}

/// De-duplicated set of cover images referenced by title records.
#[derive(Debug, Default)]
pub struct CoverPlan {
  downloads: BTreeSet<CoverDownload>,
  references: BTreeMap<String, usize>,
}

impl CoverPlan {
  /// Collect `url`, `front` and `thumbnail` links from every item of a record.
  pub fn add_record(&mut self, record: &Value) {
    let items: &[Value] = match record {
      Value::Array(items) => items,
      Value::Object(_) => std::slice::from_ref(record),
      _ => &[],
    };
    for item in items {
      for (key, kind) in [
        ("url", ImageKind::Boxart),
        ("front", ImageKind::BoxartFront),
        ("thumbnail", ImageKind::BoxartSmall),
      ] {
        if let Some(url) = item.get(key).and_then(|v| v.as_str()) {
          *self.references.entry(url.to_string()).or_default() += 1;
          self.downloads.insert(CoverDownload {
            url: url.to_string(),
            kind,
          });
        }
      }
    }
  }

  pub fn downloads(&self) -> impl Iterator<Item = &CoverDownload> {
    self.downloads.iter()
  }

  pub fn len(&self) -> usize {
    self.downloads.len()
  }

  pub fn is_empty(&self) -> bool {
    self.downloads.is_empty()
  }

  /// URLs referenced more than once, with their reference counts.
  pub fn duplicates(&self) -> Vec<(&str, usize)> {
    self
      .references
      .iter()
      .filter(|(_, count)| **count > 1)
      .map(|(url, count)| (url.as_str(), *count))
      .collect()
  }
}

/// Local file name for a cover URL: the last path segment, with `.png` appended if missing.
pub fn cover_file_name(url: &str) -> Option<String> {
  let parsed = url::Url::parse(url).ok()?;
  let name = parsed.path_segments()?.next_back()?;
  if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
    return None;
  }
  if name.ends_with(".png") {
    Some(name.to_string())
  } else {
    Some(format!("{}.png", name))
  }
}
