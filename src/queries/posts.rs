use std::sync::Arc;

use super::{post_listings, post_listings_and_counts};
use crate::api::posts as api;
use crate::cache::{QueryKey, QueryOptions};
use crate::client::ForumClient;
use crate::errors::{require, require_email, ClientResult};
use crate::models::{
    Ack, Count, CreatedPost, NewPost, PageRequest, PopularSearches, Post, PostPage, PostSort,
    PostStats, PostUpdate, SearchParams, UserPostCount, UserVote, Visibility, VoteTally,
};
use crate::query_key;

const LISTING: QueryOptions = QueryOptions::minutes(5);
const SEARCH: QueryOptions = QueryOptions::minutes(2);
const SINGLE: QueryOptions = QueryOptions::minutes(2);
const USER_POSTS: QueryOptions = QueryOptions::minutes(3);
const QUOTA: QueryOptions = QueryOptions::minutes(10);

/// Post reads and writes.
pub struct PostQueries<'a> {
    client: &'a ForumClient,
}

impl<'a> PostQueries<'a> {
    pub(crate) fn new(client: &'a ForumClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest, sort_by: PostSort) -> ClientResult<Arc<PostPage>> {
        page.validate()?;
        self.client
            .read(
                query_key!["posts", "all", page.page, page.limit, sort_by.as_str()],
                LISTING,
                move |t| async move { api::list_posts(&t, page, sort_by).await },
            )
            .await
    }

    pub async fn popular(&self, page: PageRequest) -> ClientResult<Arc<PostPage>> {
        page.validate()?;
        self.client
            .read(
                query_key!["posts", "popular", page.page, page.limit],
                LISTING,
                move |t| async move { api::popular_posts(&t, page).await },
            )
            .await
    }

    pub async fn search(&self, params: &SearchParams) -> ClientResult<Arc<PostPage>> {
        params.validate()?;
        let key = query_key![
            "posts",
            "search",
            params.query.clone(),
            params.tag.clone(),
            params.author.clone(),
            params.sort_by.as_str(),
            params.page.page,
            params.page.limit,
        ];
        let params = params.clone();
        self.client
            .read(key, SEARCH, move |t| async move {
                api::search_posts(&t, &params).await
            })
            .await
    }

    pub async fn by_tag(&self, tag: &str, page: PageRequest) -> ClientResult<Arc<PostPage>> {
        require(tag, "Tag")?;
        page.validate()?;
        let tag = tag.to_string();
        self.client
            .read(
                query_key!["posts", "tag", &tag, page.page, page.limit],
                LISTING,
                move |t| async move { api::posts_by_tag(&t, &tag, page).await },
            )
            .await
    }

    pub async fn get(&self, post_id: &str) -> ClientResult<Arc<Post>> {
        require(post_id, "Post ID")?;
        let post_id = post_id.to_string();
        self.client
            .read(
                query_key!["posts", "single", &post_id],
                SINGLE,
                move |t| async move { api::get_post(&t, &post_id).await },
            )
            .await
    }

    /// The signed-in user's vote on a post.
    pub async fn user_vote(&self, post_id: &str) -> ClientResult<Arc<UserVote>> {
        require(post_id, "Post ID")?;
        let post_id = post_id.to_string();
        self.client
            .read(
                query_key!["posts", "vote", &post_id],
                SINGLE,
                move |t| async move { api::user_vote(&t, &post_id).await },
            )
            .await
    }

    pub async fn by_user(&self, email: &str, page: PageRequest) -> ClientResult<Arc<PostPage>> {
        require_email(email)?;
        page.validate()?;
        let email = email.to_string();
        self.client
            .read(
                query_key!["posts", "user", &email, page.page, page.limit],
                USER_POSTS,
                move |t| async move { api::user_posts(&t, &email, page).await },
            )
            .await
    }

    pub async fn recent_by_user(&self, email: &str, limit: u32) -> ClientResult<Arc<PostPage>> {
        require_email(email)?;
        api::check_limit(limit)?;
        let email = email.to_string();
        self.client
            .read(
                query_key!["posts", "recent", &email, limit],
                LISTING,
                move |t| async move { api::user_recent_posts(&t, &email, limit).await },
            )
            .await
    }

    /// Post count and membership flag, used to enforce the free quota.
    pub async fn user_post_count(&self, email: &str) -> ClientResult<Arc<UserPostCount>> {
        require_email(email)?;
        let email = email.to_string();
        self.client
            .read(
                query_key!["posts", "count", &email],
                QUOTA,
                move |t| async move { api::user_post_count(&t, &email).await },
            )
            .await
    }

    pub async fn total_count(&self) -> ClientResult<Arc<Count>> {
        self.client
            .read(query_key!["posts", "total"], LISTING, |t| async move {
                api::total_post_count(&t).await
            })
            .await
    }

    pub async fn stats(&self) -> ClientResult<Arc<PostStats>> {
        self.client
            .read(query_key!["posts", "stats"], LISTING, |t| async move {
                api::post_stats(&t).await
            })
            .await
    }

    pub async fn popular_searches(&self, limit: u32) -> ClientResult<Arc<PopularSearches>> {
        api::check_limit(limit)?;
        self.client
            .read(
                query_key!["posts", "popular-searches", limit],
                LISTING,
                move |t| async move { api::popular_searches(&t, limit).await },
            )
            .await
    }

    /// Create a post. On success the new post is seeded under its own key.
    pub async fn create(&self, post: &NewPost) -> ClientResult<CreatedPost> {
        let cache = self.client.cache();
        let created = cache
            .mutate(
                &post_listings_and_counts(),
                api::create_post(self.client.transport(), post),
            )
            .await?;

        if let Some(post) = &created.post {
            cache.set(
                query_key!["posts", "single", &created.post_id],
                post.clone(),
                SINGLE,
            );
        }
        tracing::info!("Created post {}", created.post_id);
        Ok(created)
    }

    pub async fn update(&self, post_id: &str, update: &PostUpdate) -> ClientResult<Post> {
        let mut keys = post_listings();
        keys.push(query_key!["posts", "single", post_id]);
        self.client
            .cache()
            .mutate(&keys, api::update_post(self.client.transport(), post_id, update))
            .await
    }

    /// Delete a post and forget everything cached about it.
    pub async fn delete(&self, post_id: &str) -> ClientResult<Ack> {
        let cache = self.client.cache();
        let ack = cache
            .mutate(
                &post_listings_and_counts(),
                api::delete_post(self.client.transport(), post_id),
            )
            .await?;

        cache.remove(&query_key!["posts", "single", post_id]);
        cache.remove(&query_key!["posts", "vote", post_id]);
        cache.remove(&query_key!["comments", post_id]);
        tracing::info!("Deleted post {}", post_id);
        Ok(ack)
    }

    pub async fn upvote(&self, post_id: &str) -> ClientResult<VoteTally> {
        self.client
            .cache()
            .mutate(
                &vote_keys(post_id),
                api::upvote_post(self.client.transport(), post_id),
            )
            .await
    }

    pub async fn downvote(&self, post_id: &str) -> ClientResult<VoteTally> {
        self.client
            .cache()
            .mutate(
                &vote_keys(post_id),
                api::downvote_post(self.client.transport(), post_id),
            )
            .await
    }

    pub async fn set_visibility(&self, post_id: &str, visibility: Visibility) -> ClientResult<Ack> {
        let mut keys = post_listings();
        keys.push(query_key!["posts", "single", post_id]);
        self.client
            .cache()
            .mutate(
                &keys,
                api::set_visibility(self.client.transport(), post_id, visibility),
            )
            .await
    }

    /// Count a search term towards the popular-searches list.
    pub async fn record_search(&self, term: &str) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(
                &[query_key!["posts", "popular-searches"]],
                api::record_search(self.client.transport(), term),
            )
            .await
    }
}

fn vote_keys(post_id: &str) -> Vec<QueryKey> {
    let mut keys = post_listings();
    keys.push(query_key!["posts", "single", post_id]);
    keys.push(query_key!["posts", "vote", post_id]);
    keys
}
