//! Non-UI core of a desktop client for a video-sharing platform:
//! file-backed filter lists (blocked tags, blocked publishers) and the
//! popular-page view-model that merges several feed sources while dropping
//! filtered or too-short items.

pub mod constants;
pub mod feed;
pub mod filter;
pub mod model;
pub mod store;

pub use feed::{CardStyle, FeedCard, FeedPage, FeedService, PageToken, PopularFeed};
pub use model::{Partition, VideoItem};
pub use store::{FilterKind, FilterStore};
