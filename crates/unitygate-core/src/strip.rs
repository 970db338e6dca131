use crate::xml::{XmlDocument, XmlNode, XmlValue, MAX_DEPTH};

const ENTRY_FIELD: &str = "entry";
const ENTRY_TITLE_FIELDS: &[&str] = &["title"];

const MEDIA_FIELD: &str = "live:media";
const MEDIA_TITLE_FIELDS: &[&str] = &["live:reducedTitle", "live:gameReducedTitle", "live:fullTitle"];

/// Remove upstream title text from a catalog document.
///
/// Every element of an `entry` sequence loses its `title`, and every element of
/// a `live:media` sequence loses its reduced, game-reduced and full titles, at
/// any depth. Documents without those fields are left untouched.
pub fn strip_titles(doc: &mut XmlDocument) {
  strip_value(&mut doc.root, 0);
}

fn strip_value(value: &mut XmlValue, depth: usize) {
  if depth > MAX_DEPTH {
    return;
  }
  match value {
    XmlValue::Node(node) => strip_node(node, depth),
    XmlValue::Sequence(items) => {
      for item in items {
        strip_value(item, depth);
      }
    }
    XmlValue::Text(_) => {}
  }
}

fn strip_node(node: &mut XmlNode, depth: usize) {
  remove_from_elements(node, ENTRY_FIELD, ENTRY_TITLE_FIELDS);
  remove_from_elements(node, MEDIA_FIELD, MEDIA_TITLE_FIELDS);

  for (_, child) in node.fields.iter_mut() {
    strip_value(child, depth + 1);
  }
}

fn remove_from_elements(node: &mut XmlNode, field: &str, names: &[&str]) {
  if let Some(XmlValue::Sequence(items)) = node.get_mut(field) {
    for item in items.iter_mut() {
      if let XmlValue::Node(element) = item {
        for name in names {
          element.remove(name);
        }
      }
    }
  }
}
