/// Cover-art image families served from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKind {
  Boxart,
  BoxartFront,
  BoxartSmall,
}

impl ImageKind {
  pub const ALL: [ImageKind; 3] = [ImageKind::Boxart, ImageKind::BoxartFront, ImageKind::BoxartSmall];

  /// Parse the `{type}` segment of an image request.
  pub fn from_segment(segment: &str) -> Option<Self> {
    match segment {
      "boxart" => Some(ImageKind::Boxart),
      "boxartfront" => Some(ImageKind::BoxartFront),
      "boxartsm" => Some(ImageKind::BoxartSmall),
      _ => None,
    }
  }

  pub fn dir_name(self) -> &'static str {
    match self {
      ImageKind::Boxart => "boxart",
      ImageKind::BoxartFront => "boxartfront",
      ImageKind::BoxartSmall => "boxartsm",
    }
  }
}

/// Numeric image id (`[0-9]+`) or `None`.
pub fn parse_asset_id(segment: &str) -> Option<&str> {
  if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
    Some(segment)
  } else {
    None
  }
}

pub fn asset_file_name(id: &str) -> String {
  format!("{}.png", id)
}
