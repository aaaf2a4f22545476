//! Tuneable constants, embedded from `constants.ron` at compile time via
//! `include_str!` (no runtime file I/O) and parsed once via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Items at or below this duration (seconds) are dropped from every feed.
  pub min_duration_secs: u64,

  // Filter list files
  pub tag_filter_file: String,
  pub uid_filter_file: String,

  /// The news partition has no ranking list and is excluded from rank browsing.
  pub news_partition_id: String,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // The RON file ships inside the binary; a malformed file can only come from a bad edit.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// The parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
