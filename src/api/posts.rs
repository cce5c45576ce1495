//! Post API endpoints.

use serde::Serialize;

use crate::errors::{require, require_email, ClientError, ClientResult};
use crate::models::{
    Ack, Count, CreatedPost, NewPost, PageRequest, PopularSearches, Post, PostPage, PostSort,
    PostStats, PostUpdate, SearchParams, UserPostCount, UserVote, Visibility, VoteTally,
    MAX_PAGE_LIMIT,
};
use crate::transport::{ApiRequest, Transport};

#[derive(Serialize)]
struct VisibilityBody {
    visibility: Visibility,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTermBody<'a> {
    search_term: &'a str,
}

/// GET /posts - Paginated post listing.
pub async fn list_posts(
    transport: &Transport,
    page: PageRequest,
    sort_by: PostSort,
) -> ClientResult<PostPage> {
    page.validate()?;

    let request = ApiRequest::get("posts")
        .query("page", page.page)
        .query("limit", page.limit)
        .query("sortBy", sort_by.as_str());
    transport.credentialed().send(request).await
}

/// GET /posts/popular - Posts ordered by vote difference.
pub async fn popular_posts(transport: &Transport, page: PageRequest) -> ClientResult<PostPage> {
    page.validate()?;

    let request = ApiRequest::get("posts")
        .segment("popular")
        .query("page", page.page)
        .query("limit", page.limit);
    transport.credentialed().send(request).await
}

/// GET /posts/search - Filtered search.
pub async fn search_posts(transport: &Transport, params: &SearchParams) -> ClientResult<PostPage> {
    params.validate()?;

    let request = ApiRequest::get("posts")
        .segment("search")
        .query_opt("query", params.query.as_deref())
        .query_opt("tag", params.tag.as_deref())
        .query_opt("author", params.author.as_deref())
        .query("sortBy", params.sort_by.as_str())
        .query("page", params.page.page)
        .query("limit", params.page.limit);
    transport.credentialed().send(request).await
}

/// GET /posts/tag/:tag - Posts carrying one tag.
pub async fn posts_by_tag(
    transport: &Transport,
    tag: &str,
    page: PageRequest,
) -> ClientResult<PostPage> {
    require(tag, "Tag")?;
    page.validate()?;

    let request = ApiRequest::get("posts")
        .segment("tag")
        .segment(tag)
        .query("page", page.page)
        .query("limit", page.limit);
    transport.credentialed().send(request).await
}

/// GET /posts/:id - Single post.
pub async fn get_post(transport: &Transport, post_id: &str) -> ClientResult<Post> {
    require(post_id, "Post ID")?;

    transport
        .credentialed()
        .send(ApiRequest::get("posts").segment(post_id))
        .await
}

/// POST /posts - Create a post. The backend enforces the free-tier quota.
pub async fn create_post(transport: &Transport, post: &NewPost) -> ClientResult<CreatedPost> {
    post.validate()?;

    let request = ApiRequest::post("posts").json(post)?;
    transport.credentialed().send(request).await
}

/// PUT /posts/:id - Update a post.
pub async fn update_post(
    transport: &Transport,
    post_id: &str,
    update: &PostUpdate,
) -> ClientResult<Post> {
    require(post_id, "Post ID")?;
    update.validate()?;

    let request = ApiRequest::put("posts").segment(post_id).json(update)?;
    transport.credentialed().send(request).await
}

/// DELETE /posts/:id - Delete a post.
pub async fn delete_post(transport: &Transport, post_id: &str) -> ClientResult<Ack> {
    require(post_id, "Post ID")?;

    transport
        .credentialed()
        .send(ApiRequest::delete("posts").segment(post_id))
        .await
}

/// PATCH /posts/:id/upvote
pub async fn upvote_post(transport: &Transport, post_id: &str) -> ClientResult<VoteTally> {
    require(post_id, "Post ID")?;

    let request = ApiRequest::patch("posts").segment(post_id).segment("upvote");
    transport.credentialed().send(request).await
}

/// PATCH /posts/:id/downvote
pub async fn downvote_post(transport: &Transport, post_id: &str) -> ClientResult<VoteTally> {
    require(post_id, "Post ID")?;

    let request = ApiRequest::patch("posts")
        .segment(post_id)
        .segment("downvote");
    transport.credentialed().send(request).await
}

/// GET /posts/:id/vote - The signed-in user's vote on a post.
pub async fn user_vote(transport: &Transport, post_id: &str) -> ClientResult<UserVote> {
    require(post_id, "Post ID")?;

    let request = ApiRequest::get("posts").segment(post_id).segment("vote");
    transport.credentialed().send(request).await
}

/// PATCH /posts/:id/visibility
pub async fn set_visibility(
    transport: &Transport,
    post_id: &str,
    visibility: Visibility,
) -> ClientResult<Ack> {
    require(post_id, "Post ID")?;

    let request = ApiRequest::patch("posts")
        .segment(post_id)
        .segment("visibility")
        .json(&VisibilityBody { visibility })?;
    transport.credentialed().send(request).await
}

/// GET /posts/user/:email - A user's posts.
pub async fn user_posts(
    transport: &Transport,
    email: &str,
    page: PageRequest,
) -> ClientResult<PostPage> {
    require_email(email)?;
    page.validate()?;

    let request = ApiRequest::get("posts")
        .segment("user")
        .segment(email)
        .query("page", page.page)
        .query("limit", page.limit);
    transport.credentialed().send(request).await
}

/// GET /posts/user/:email/recent - A user's latest posts for the profile page.
pub async fn user_recent_posts(
    transport: &Transport,
    email: &str,
    limit: u32,
) -> ClientResult<PostPage> {
    require_email(email)?;
    check_limit(limit)?;

    let request = ApiRequest::get("posts")
        .segment("user")
        .segment(email)
        .segment("recent")
        .query("limit", limit);
    transport.credentialed().send(request).await
}

/// GET /posts/count/:email - Post count and membership of one user.
pub async fn user_post_count(transport: &Transport, email: &str) -> ClientResult<UserPostCount> {
    require_email(email)?;

    let request = ApiRequest::get("posts").segment("count").segment(email);
    transport.credentialed().send(request).await
}

/// GET /posts/count - Total number of posts.
pub async fn total_post_count(transport: &Transport) -> ClientResult<Count> {
    transport
        .credentialed()
        .send(ApiRequest::get("posts").segment("count"))
        .await
}

/// GET /posts/stats - Admin dashboard counters.
pub async fn post_stats(transport: &Transport) -> ClientResult<PostStats> {
    transport
        .credentialed()
        .send(ApiRequest::get("posts").segment("stats"))
        .await
}

/// GET /posts/popular-searches
pub async fn popular_searches(transport: &Transport, limit: u32) -> ClientResult<PopularSearches> {
    check_limit(limit)?;

    let request = ApiRequest::get("posts")
        .segment("popular-searches")
        .query("limit", limit);
    transport.credentialed().send(request).await
}

/// POST /posts/popular-searches - Record a search term.
pub async fn record_search(transport: &Transport, term: &str) -> ClientResult<Ack> {
    require(term, "Search term")?;

    let request = ApiRequest::post("posts")
        .segment("popular-searches")
        .json(&SearchTermBody {
            search_term: term.trim(),
        })?;
    transport.credentialed().send(request).await
}

pub(crate) fn check_limit(limit: u32) -> ClientResult<()> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ClientError::Validation(format!(
            "Limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }
    Ok(())
}
