use serde_json::Value;

/// Flatten a parsed catalog into its entry list.
///
/// The catalog is either the entry array itself or an object wrapping it; for
/// an object the first array-valued field is used, and an object without one
/// yields no entries. Any other top-level shape is an error.
pub fn normalize_catalog(catalog: Value) -> Result<Vec<Value>, String> {
  match catalog {
    Value::Array(entries) => Ok(entries),
    Value::Object(map) => Ok(
      map
        .into_iter()
        .find_map(|(_, v)| match v {
          Value::Array(entries) => Some(entries),
          _ => None,
        })
        .unwrap_or_default(),
    ),
    other => Err(format!("unexpected catalog shape: {}", type_name(&other))),
  }
}

/// First entry whose `HBTitleID` equals `title_id`, ignoring case.
pub fn find_entry<'a>(entries: &'a [Value], title_id: &str) -> Option<&'a Value> {
  let wanted = title_id.to_lowercase();
  entries.iter().find(|entry| {
    entry
      .get("HBTitleID")
      .and_then(|v| v.as_str())
      .is_some_and(|id| id.to_lowercase() == wanted)
  })
}

/// `TitleID` of an entry as used for the canonical record file name.
pub fn canonical_title_id(entry: &Value) -> Option<String> {
  match entry.get("TitleID")? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
