//! Forum Client
//!
//! Typed REST client for the discussion-forum backend with a query cache that
//! de-duplicates concurrent reads, honours per-query staleness windows and
//! invalidates affected queries after every successful write.
//!
//! ```no_run
//! use forum_client::{Config, ForumClient};
//! use forum_client::models::{PageRequest, PostSort};
//!
//! # async fn run() -> forum_client::ClientResult<()> {
//! let client = ForumClient::new(&Config::from_env()?)?;
//! let page = client.posts().list(PageRequest::new(1, 10), PostSort::Newest).await?;
//! println!("{} posts", page.posts.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod queries;
pub mod transport;

pub use cache::{QueryCache, QueryKey, QueryOptions};
pub use client::ForumClient;
pub use config::Config;
pub use errors::{ClientError, ClientResult};
