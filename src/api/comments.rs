//! Comment API endpoints, including reports and moderation.

use serde::Serialize;

use crate::errors::{require, ClientResult};
use crate::models::{
    Ack, Comment, CommentPage, Count, ModerationAction, NewComment, PageRequest, ReportFeedback,
};
use crate::transport::{ApiRequest, Transport};

#[derive(Serialize)]
struct ReportBody {
    feedback: ReportFeedback,
}

#[derive(Serialize)]
struct ModerationBody {
    action: ModerationAction,
}

/// GET /posts/:id/comments
pub async fn list_comments(
    transport: &Transport,
    post_id: &str,
    page: PageRequest,
) -> ClientResult<CommentPage> {
    require(post_id, "Post ID")?;
    page.validate()?;

    let request = ApiRequest::get("posts")
        .segment(post_id)
        .segment("comments")
        .query("page", page.page)
        .query("limit", page.limit);
    transport.credentialed().send(request).await
}

/// POST /posts/:id/comments
pub async fn add_comment(
    transport: &Transport,
    post_id: &str,
    comment: &NewComment,
) -> ClientResult<Comment> {
    require(post_id, "Post ID")?;
    comment.validate()?;

    let request = ApiRequest::post("posts")
        .segment(post_id)
        .segment("comments")
        .json(comment)?;
    transport.credentialed().send(request).await
}

/// DELETE /posts/:id/comments/:cid
pub async fn delete_comment(
    transport: &Transport,
    post_id: &str,
    comment_id: &str,
) -> ClientResult<Ack> {
    require(post_id, "Post ID")?;
    require(comment_id, "Comment ID")?;

    let request = ApiRequest::delete("posts")
        .segment(post_id)
        .segment("comments")
        .segment(comment_id);
    transport.credentialed().send(request).await
}

/// POST /posts/:id/comments/:cid/report
pub async fn report_comment(
    transport: &Transport,
    post_id: &str,
    comment_id: &str,
    feedback: ReportFeedback,
) -> ClientResult<Ack> {
    require(post_id, "Post ID")?;
    require(comment_id, "Comment ID")?;

    let request = ApiRequest::post("posts")
        .segment(post_id)
        .segment("comments")
        .segment(comment_id)
        .segment("report")
        .json(&ReportBody { feedback })?;
    transport.credentialed().send(request).await
}

/// GET /posts/reported-comments - Moderation queue.
pub async fn reported_comments(
    transport: &Transport,
    page: PageRequest,
) -> ClientResult<CommentPage> {
    page.validate()?;

    let request = ApiRequest::get("posts")
        .segment("reported-comments")
        .query("page", page.page)
        .query("limit", page.limit);
    transport.credentialed().send(request).await
}

/// PATCH /posts/reported-comments/:cid - Resolve, dismiss or delete.
pub async fn moderate_comment(
    transport: &Transport,
    comment_id: &str,
    action: ModerationAction,
) -> ClientResult<Ack> {
    require(comment_id, "Comment ID")?;

    let request = ApiRequest::patch("posts")
        .segment("reported-comments")
        .segment(comment_id)
        .json(&ModerationBody { action })?;
    transport.credentialed().send(request).await
}

/// GET /comments/count
pub async fn total_comment_count(transport: &Transport) -> ClientResult<Count> {
    transport
        .credentialed()
        .send(ApiRequest::get("comments").segment("count"))
        .await
}
