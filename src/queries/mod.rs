//! Cached reads and invalidating writes over the resource API.
//!
//! Each read derives its [`QueryKey`], picks its staleness window and goes
//! through the client's [`QueryCache`](crate::cache::QueryCache). Each write
//! runs once and, on success, marks its invalidation set stale.

mod announcements;
mod comments;
mod posts;
mod tags;
mod users;

pub use announcements::AnnouncementQueries;
pub use comments::CommentQueries;
pub use posts::PostQueries;
pub use tags::TagQueries;
pub use users::UserQueries;

use crate::cache::QueryKey;
use crate::query_key;

/// Every cached post listing, as invalidation prefixes.
pub(crate) fn post_listings() -> Vec<QueryKey> {
    ["all", "popular", "search", "tag", "user", "recent"]
        .into_iter()
        .map(|kind| query_key!["posts", kind])
        .collect()
}

/// Post listings plus the post counters.
pub(crate) fn post_listings_and_counts() -> Vec<QueryKey> {
    let mut keys = post_listings();
    keys.extend([
        query_key!["posts", "count"],
        query_key!["posts", "total"],
        query_key!["posts", "stats"],
    ]);
    keys
}
