//! Popular-page view-model: fetches several feed sources, filters each
//! batch, and merges survivors into one display sequence.
//!
//! Fetches are awaited one at a time from a single caller; a failure in one
//! source is logged and contributes zero items without affecting siblings.

use anyhow::Result;
use tracing::{debug, error};

use crate::constants::constants;
use crate::filter::accept;
use crate::model::{Partition, VideoItem};
use crate::store::FilterStore;

/// Opaque paging cursor owned by the remote service.
pub type PageToken = String;

/// One page from a cursored feed source.
#[derive(Debug, Clone)]
pub struct FeedPage {
  pub items: Vec<VideoItem>,
  /// Cursor for the next page, if the service reports more.
  pub next: Option<PageToken>,
}

/// The remote feed service seam. The wire protocol lives behind this trait;
/// the view-model only consumes items, partitions, and opaque page tokens.
#[allow(async_fn_in_trait)]
pub trait FeedService {
  async fn recommended(&self, token: Option<&PageToken>) -> Result<FeedPage>;
  async fn hot(&self, token: Option<&PageToken>) -> Result<FeedPage>;
  async fn global_rank(&self) -> Result<Vec<VideoItem>>;
  async fn partition_rank(&self, partition: &Partition) -> Result<Vec<VideoItem>>;
  async fn partitions(&self) -> Result<Vec<Partition>>;
}

/// Which feed source produced a card — drives presentation styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStyle {
  Recommend,
  Hot,
  Rank,
}

/// A filtered item in the merged display sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedCard {
  pub video: VideoItem,
  pub style: CardStyle,
}

/// View-model for the popular page. Owns the filter store and the merged
/// display sequence; batches are appended in call order with no cross-batch
/// re-sorting or deduplication.
pub struct PopularFeed<S> {
  service: S,
  store: FilterStore,
  /// Merged display sequence of filtered cards.
  pub videos: Vec<FeedCard>,
  /// Rank partitions available for browsing (news excluded).
  pub partitions: Vec<Partition>,
  /// Whether a partition-list fetch is in flight. Reset unconditionally,
  /// success or failure.
  pub partitions_loading: bool,
  recommend_token: Option<PageToken>,
  hot_token: Option<PageToken>,
}

impl<S: FeedService> PopularFeed<S> {
  pub fn new(service: S, store: FilterStore) -> Self {
    Self {
      service,
      store,
      videos: Vec::new(),
      partitions: Vec::new(),
      partitions_loading: false,
      recommend_token: None,
      hot_token: None,
    }
  }

  /// Fetch the next recommended page and append survivors.
  pub async fn load_recommended(&mut self) {
    match self.service.recommended(self.recommend_token.as_ref()).await {
      Ok(page) => {
        self.recommend_token = page.next;
        self.try_add_videos(page.items, CardStyle::Recommend);
      }
      Err(e) => error!(err = %e, "failed to load recommended videos"),
    }
  }

  /// Fetch the next hot page and append survivors.
  pub async fn load_hot(&mut self) {
    match self.service.hot(self.hot_token.as_ref()).await {
      Ok(page) => {
        self.hot_token = page.next;
        self.try_add_videos(page.items, CardStyle::Hot);
      }
      Err(e) => error!(err = %e, "failed to load hot videos"),
    }
  }

  /// Fetch the global ranking list and append survivors.
  pub async fn load_global_rank(&mut self) {
    match self.service.global_rank().await {
      Ok(videos) => self.try_add_videos(videos, CardStyle::Rank),
      Err(e) => error!(err = %e, "failed to load the global ranking list"),
    }
  }

  /// Fetch one partition's ranking list and append survivors.
  pub async fn load_partition_rank(&mut self, partition: &Partition) {
    match self.service.partition_rank(partition).await {
      Ok(videos) => self.try_add_videos(videos, CardStyle::Rank),
      Err(e) => error!(partition = %partition.name, err = %e, "failed to load partition ranking list"),
    }
  }

  /// Fetch the partition list. The news partition is excluded because it has
  /// no ranking list. The busy flag never stays stuck on failure.
  pub async fn load_partitions(&mut self) {
    self.partitions_loading = true;

    match self.service.partitions().await {
      Ok(partitions) => {
        self.partitions.extend(partitions.into_iter().filter(|p| p.id != constants().news_partition_id));
      }
      Err(e) => error!(err = %e, "failed to load the partition list"),
    }

    self.partitions_loading = false;
  }

  /// Remove a single card from the display sequence by video id.
  pub fn remove_video(&mut self, id: &str) {
    if let Some(pos) = self.videos.iter().position(|c| c.video.id == id) {
      self.videos.remove(pos);
    }
  }

  /// Filter lists for the UI (e.g. the block-tag / block-publisher actions).
  pub fn store_mut(&mut self) -> &mut FilterStore {
    &mut self.store
  }

  /// Run a fetched batch through the filter and append survivors in fetch order.
  fn try_add_videos(&mut self, items: Vec<VideoItem>, style: CardStyle) {
    // First batch triggers the lazy filter-list load; later calls are no-ops.
    self.store.load_all();
    let min = constants().min_duration_secs;

    let before = self.videos.len();
    let total = items.len();
    for item in items {
      if accept(&item, self.store.tags(), self.store.uids(), min) {
        self.videos.push(FeedCard { video: item, style });
      }
    }
    let kept = self.videos.len() - before;
    debug!(kept, dropped = total - kept, ?style, "filtered feed batch");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use anyhow::anyhow;
  use std::collections::HashMap;
  use tempfile::TempDir;

  use crate::model::EXT_TITLE;
  use crate::store::FilterKind;

  fn video(id: &str, duration_secs: u64, publisher_id: &str, title: &str) -> VideoItem {
    let mut extensions = HashMap::new();
    extensions.insert(EXT_TITLE.to_string(), serde_json::json!(title));
    VideoItem { id: id.to_string(), duration_secs, publisher_id: publisher_id.to_string(), extensions }
  }

  /// Canned responses standing in for the remote service.
  #[derive(Default)]
  struct StubService {
    recommended: Vec<VideoItem>,
    recommended_next: Option<PageToken>,
    hot: Vec<VideoItem>,
    fail_hot: bool,
    rank: Vec<VideoItem>,
    partition_rank: Vec<VideoItem>,
    partitions: Vec<Partition>,
    fail_partitions: bool,
  }

  impl FeedService for StubService {
    async fn recommended(&self, _token: Option<&PageToken>) -> Result<FeedPage> {
      Ok(FeedPage { items: self.recommended.clone(), next: self.recommended_next.clone() })
    }

    async fn hot(&self, _token: Option<&PageToken>) -> Result<FeedPage> {
      if self.fail_hot {
        return Err(anyhow!("hot feed unavailable"));
      }
      Ok(FeedPage { items: self.hot.clone(), next: None })
    }

    async fn global_rank(&self) -> Result<Vec<VideoItem>> {
      Ok(self.rank.clone())
    }

    async fn partition_rank(&self, _partition: &Partition) -> Result<Vec<VideoItem>> {
      Ok(self.partition_rank.clone())
    }

    async fn partitions(&self) -> Result<Vec<Partition>> {
      if self.fail_partitions {
        return Err(anyhow!("partition list unavailable"));
      }
      Ok(self.partitions.clone())
    }
  }

  fn feed(service: StubService) -> (TempDir, PopularFeed<StubService>) {
    let dir = TempDir::new().expect("temp dir");
    let store = FilterStore::new(dir.path());
    (dir, PopularFeed::new(service, store))
  }

  fn ids(feed: &PopularFeed<StubService>) -> Vec<&str> {
    feed.videos.iter().map(|c| c.video.id.as_str()).collect()
  }

  // --- merging ---

  #[tokio::test]
  async fn batches_append_in_call_order() {
    let service = StubService {
      recommended: vec![video("r1", 60, "a", "one"), video("r2", 60, "b", "two")],
      hot: vec![video("h1", 60, "c", "three")],
      rank: vec![video("g1", 60, "d", "four")],
      ..StubService::default()
    };
    let (_dir, mut feed) = feed(service);

    feed.load_recommended().await;
    feed.load_hot().await;
    feed.load_global_rank().await;

    assert_eq!(ids(&feed), vec!["r1", "r2", "h1", "g1"]);
    assert_eq!(feed.videos[0].style, CardStyle::Recommend);
    assert_eq!(feed.videos[2].style, CardStyle::Hot);
    assert_eq!(feed.videos[3].style, CardStyle::Rank);
  }

  #[tokio::test]
  async fn failed_source_contributes_nothing_and_spares_siblings() {
    let service = StubService {
      recommended: vec![video("r1", 60, "a", "one")],
      fail_hot: true,
      rank: vec![video("g1", 60, "d", "four")],
      ..StubService::default()
    };
    let (_dir, mut feed) = feed(service);

    feed.load_recommended().await;
    feed.load_hot().await;
    feed.load_global_rank().await;

    assert_eq!(ids(&feed), vec!["r1", "g1"]);
  }

  #[tokio::test]
  async fn recommend_token_advances_on_success() {
    let service = StubService {
      recommended: vec![video("r1", 60, "a", "one")],
      recommended_next: Some("page-2".to_string()),
      ..StubService::default()
    };
    let (_dir, mut feed) = feed(service);

    feed.load_recommended().await;
    assert_eq!(feed.recommend_token.as_deref(), Some("page-2"));
  }

  // --- filtering ---

  #[tokio::test]
  async fn short_and_blocked_items_are_dropped() {
    let service = StubService {
      recommended: vec![
        video("short", 30, "a", "fine"),
        video("blocked-title", 60, "a", "annoying music mix"),
        video("blocked-uid", 60, "spammer", "fine"),
        video("kept", 60, "a", "fine"),
      ],
      ..StubService::default()
    };
    let (_dir, mut feed) = feed(service);
    feed.store_mut().add(FilterKind::Tag, "music").unwrap();
    feed.store_mut().add(FilterKind::Uid, "spammer").unwrap();

    feed.load_recommended().await;
    assert_eq!(ids(&feed), vec!["kept"]);
  }

  #[tokio::test]
  async fn partition_rank_respects_filters() {
    let service = StubService {
      partition_rank: vec![video("p1", 60, "spammer", "fine"), video("p2", 60, "a", "fine")],
      ..StubService::default()
    };
    let (_dir, mut feed) = feed(service);
    feed.store_mut().add(FilterKind::Uid, "spammer").unwrap();

    let partition = Partition { id: "3".to_string(), name: "Music".to_string() };
    feed.load_partition_rank(&partition).await;
    assert_eq!(ids(&feed), vec!["p2"]);
  }

  // --- partitions ---

  #[tokio::test]
  async fn load_partitions_excludes_news() {
    let service = StubService {
      partitions: vec![
        Partition { id: "3".to_string(), name: "Music".to_string() },
        Partition { id: "202".to_string(), name: "News".to_string() },
        Partition { id: "4".to_string(), name: "Gaming".to_string() },
      ],
      ..StubService::default()
    };
    let (_dir, mut feed) = feed(service);

    feed.load_partitions().await;
    let names: Vec<&str> = feed.partitions.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Music", "Gaming"]);
    assert!(!feed.partitions_loading);
  }

  #[tokio::test]
  async fn partitions_loading_flag_resets_on_failure() {
    let service = StubService { fail_partitions: true, ..StubService::default() };
    let (_dir, mut feed) = feed(service);

    feed.load_partitions().await;
    assert!(!feed.partitions_loading);
    assert!(feed.partitions.is_empty());
  }

  // --- removal ---

  #[tokio::test]
  async fn remove_video_drops_only_the_first_match() {
    let service = StubService {
      recommended: vec![video("r1", 60, "a", "one"), video("r2", 60, "b", "two")],
      ..StubService::default()
    };
    let (_dir, mut feed) = feed(service);

    feed.load_recommended().await;
    feed.remove_video("r1");
    assert_eq!(ids(&feed), vec!["r2"]);

    // Removing an unknown id is a no-op.
    feed.remove_video("missing");
    assert_eq!(ids(&feed), vec!["r2"]);
  }
}
