//! The forum client service.

use std::future::Future;
use std::sync::Arc;

use crate::api::auth;
use crate::cache::{QueryCache, QueryKey, QueryOptions};
use crate::config::Config;
use crate::errors::ClientResult;
use crate::models::SessionToken;
use crate::queries::{AnnouncementQueries, CommentQueries, PostQueries, TagQueries, UserQueries};
use crate::transport::Transport;

/// Transport plus query cache, shared by every consumer.
///
/// Cloning is cheap and clones share the cache.
#[derive(Debug, Clone)]
pub struct ForumClient {
    transport: Arc<Transport>,
    cache: QueryCache,
}

impl ForumClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let transport = Transport::new(config)?;
        tracing::info!("Forum client using {}", config.api_base_url);
        Ok(Self::with_cache(
            transport,
            QueryCache::new(config.default_stale_time),
        ))
    }

    /// Build around an existing cache, e.g. one shared with another client.
    pub fn with_cache(transport: Transport, cache: QueryCache) -> Self {
        Self {
            transport: Arc::new(transport),
            cache,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn posts(&self) -> PostQueries<'_> {
        PostQueries::new(self)
    }

    pub fn comments(&self) -> CommentQueries<'_> {
        CommentQueries::new(self)
    }

    pub fn announcements(&self) -> AnnouncementQueries<'_> {
        AnnouncementQueries::new(self)
    }

    pub fn tags(&self) -> TagQueries<'_> {
        TagQueries::new(self)
    }

    pub fn users(&self) -> UserQueries<'_> {
        UserQueries::new(self)
    }

    /// Exchange an identity-provider token for the session cookie.
    ///
    /// Everything cached so far was fetched as another identity and is dropped.
    pub async fn sign_in(&self, id_token: &str) -> ClientResult<SessionToken> {
        let token = auth::exchange_token(&self.transport, id_token).await?;
        self.cache.clear();
        tracing::info!("Session established, cache cleared");
        Ok(token)
    }

    /// Cached read of anything not covered by the resource queries, using the
    /// cache's default stale window.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> ClientResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<Transport>) -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        self.read(key, self.cache.default_options(), fetch).await
    }

    pub(crate) async fn read<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> ClientResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<Transport>) -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let transport = self.transport.clone();
        self.cache
            .query(key, options, move || fetch(transport))
            .await
    }

    /// Drop all cached state.
    pub fn shutdown(&self) {
        self.cache.clear();
        tracing::info!("Forum client shut down");
    }
}
