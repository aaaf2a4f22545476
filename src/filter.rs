//! Per-item accept/reject decision for feed batches.

use crate::model::VideoItem;

/// Decide whether a fetched item reaches the display sequence.
///
/// Rejected if ANY holds (short-circuit):
/// 1. duration at or below `min_duration_secs`,
/// 2. the tag list is non-empty and the item matches a blocked tag,
/// 3. the UID list is non-empty and contains the item's publisher.
pub fn accept(item: &VideoItem, tags: &[String], uids: &[String], min_duration_secs: u64) -> bool {
  if item.duration_secs <= min_duration_secs {
    return false;
  }
  if !tags.is_empty() && matches_tag(item, tags) {
    return false;
  }
  if !uids.is_empty() && uids.iter().any(|u| u == &item.publisher_id) {
    return false;
  }
  true
}

/// An item matches the tag list if its "TagName" extension value equals a
/// blocked tag verbatim, or its title contains a blocked tag as a substring
/// (case-sensitive).
fn matches_tag(item: &VideoItem, tags: &[String]) -> bool {
  if let Some(tag_name) = item.tag_name()
    && tags.iter().any(|t| t == tag_name)
  {
    return true;
  }
  let title = item.title();
  tags.iter().any(|tag| title.contains(tag.as_str()))
}
