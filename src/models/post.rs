//! Post model and the request/response shapes around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PageRequest, Pagination};
use crate::errors::{require, require_email, ClientError, ClientResult};

/// Number of posts a non-member may publish.
pub const FREE_POST_LIMIT: u32 = 5;

/// Post visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Sort order accepted by the listing and search endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    Popular,
    Relevance,
}

impl PostSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSort::Newest => "newest",
            PostSort::Oldest => "oldest",
            PostSort::Popular => "popular",
            PostSort::Relevance => "relevance",
        }
    }
}

/// A forum post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub author_image: String,
    #[serde(default)]
    pub up_vote: i64,
    #[serde(default)]
    pub down_vote: i64,
    #[serde(default)]
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl Post {
    /// Vote difference, the popularity measure.
    pub fn score(&self) -> i64 {
        self.up_vote - self.down_vote
    }
}

/// Search metadata attached to search results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default)]
    pub results_found: u64,
}

/// One page of posts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_info: Option<SearchInfo>,
}

/// Request body for creating a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub tag: String,
    pub author_name: String,
    pub author_email: String,
    #[serde(default)]
    pub author_image: String,
}

impl NewPost {
    pub fn validate(&self) -> ClientResult<()> {
        require(&self.title, "Title")?;
        require(&self.description, "Description")?;
        require(&self.tag, "Tag")?;
        require_email(&self.author_email)
    }
}

/// Request body for a partial post update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl PostUpdate {
    pub fn validate(&self) -> ClientResult<()> {
        if self.title.is_none() && self.description.is_none() && self.tag.is_none() {
            return Err(ClientError::Validation(
                "Post update has no changes".to_string(),
            ));
        }
        if let Some(title) = &self.title {
            require(title, "Title")?;
        }
        if let Some(description) = &self.description {
            require(description, "Description")?;
        }
        if let Some(tag) = &self.tag {
            require(tag, "Tag")?;
        }
        Ok(())
    }
}

/// Response of `POST /posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    #[serde(alias = "insertedId")]
    pub post_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

/// Vote counts after a vote action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    #[serde(default)]
    pub up_vote: i64,
    #[serde(default)]
    pub down_vote: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<VoteDirection>,
}

/// The signed-in user's vote on one post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserVote {
    #[serde(default)]
    pub vote: Option<VoteDirection>,
}

/// Post quota information for one user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostCount {
    #[serde(default)]
    pub post_count: u32,
    #[serde(default)]
    pub is_member: bool,
}

impl UserPostCount {
    /// Members post without limit; everyone else up to [`FREE_POST_LIMIT`].
    pub fn can_post(&self) -> bool {
        self.is_member || self.post_count < FREE_POST_LIMIT
    }

    /// Posts left before the free quota is reached, `None` for members.
    pub fn remaining(&self) -> Option<u32> {
        (!self.is_member).then(|| FREE_POST_LIMIT.saturating_sub(self.post_count))
    }
}

/// Search criteria for `GET /posts/search`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchParams {
    pub query: Option<String>,
    pub tag: Option<String>,
    pub author: Option<String>,
    pub sort_by: PostSort,
    pub page: PageRequest,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            tag: None,
            author: None,
            sort_by: PostSort::Relevance,
            page: PageRequest::default(),
        }
    }
}

impl SearchParams {
    /// Free-text search.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn sort_by(mut self, sort_by: PostSort) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// True when at least one of query, tag or author is non-blank.
    pub fn has_criteria(&self) -> bool {
        [&self.query, &self.tag, &self.author]
            .into_iter()
            .flatten()
            .any(|v| !v.trim().is_empty())
    }

    pub fn validate(&self) -> ClientResult<()> {
        if !self.has_criteria() {
            return Err(ClientError::Validation(
                "Search needs a query, tag or author".to_string(),
            ));
        }
        self.page.validate()
    }
}

/// A frequently searched term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularSearch {
    pub search_term: String,
    #[serde(default)]
    pub count: u64,
}

/// Response of `GET /posts/popular-searches`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopularSearches {
    #[serde(default)]
    pub searches: Vec<PopularSearch>,
}

/// Site-wide counters for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostStats {
    pub total_posts: u64,
    pub total_comments: u64,
    pub total_users: u64,
    pub posts_today: u64,
    pub comments_today: u64,
    pub new_users_today: u64,
    pub active_users: u64,
    pub reported_content: u64,
}
