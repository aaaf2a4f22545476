//! Data model for feed items as the remote service reports them.
//!
//! Only the fields the filtering core consumes are modeled as first-class;
//! everything platform-specific rides in the open extension map.

use serde::Deserialize;
use std::collections::HashMap;

/// Extension key carrying the item's primary tag name.
pub const EXT_TAG_NAME: &str = "TagName";

/// Extension key carrying the item's display title.
pub const EXT_TITLE: &str = "Title";

/// A single video entry from any feed listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoItem {
  pub id: String,
  /// Total length in seconds.
  pub duration_secs: u64,
  /// Identifier of the publishing account.
  pub publisher_id: String,
  /// Open key/value bag for platform metadata not modeled as first-class fields.
  #[serde(default)]
  pub extensions: HashMap<String, serde_json::Value>,
}

impl VideoItem {
  /// Look up a string extension value. Missing keys and non-string values
  /// are both treated as absent — malformed metadata never errors.
  pub fn extension_str(&self, key: &str) -> Option<&str> {
    self.extensions.get(key).and_then(|v| v.as_str())
  }

  pub fn tag_name(&self) -> Option<&str> {
    self.extension_str(EXT_TAG_NAME)
  }

  pub fn title(&self) -> &str {
    self.extension_str(EXT_TITLE).unwrap_or("")
  }
}

/// A content partition (top-level category) of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Partition {
  pub id: String,
  pub name: String,
}
