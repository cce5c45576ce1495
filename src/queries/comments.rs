use std::sync::Arc;

use crate::api::comments as api;
use crate::cache::{QueryKey, QueryOptions};
use crate::client::ForumClient;
use crate::errors::{require, ClientResult};
use crate::models::{
    Ack, Comment, CommentPage, Count, ModerationAction, NewComment, PageRequest, ReportFeedback,
};
use crate::query_key;

const THREAD: QueryOptions = QueryOptions::minutes(2);
const REPORTED: QueryOptions = QueryOptions::minutes(1);
const TOTAL: QueryOptions = QueryOptions::minutes(5);

/// Keys touched when a comment is added to or removed from a post.
fn thread_keys(post_id: &str) -> [QueryKey; 5] {
    [
        query_key!["comments", post_id],
        query_key!["comments", "total"],
        query_key!["comments", "reported"],
        query_key!["posts", "single", post_id],
        query_key!["posts", "stats"],
    ]
}

/// Comment threads and moderation.
pub struct CommentQueries<'a> {
    client: &'a ForumClient,
}

impl<'a> CommentQueries<'a> {
    pub(crate) fn new(client: &'a ForumClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, post_id: &str, page: PageRequest) -> ClientResult<Arc<CommentPage>> {
        require(post_id, "Post ID")?;
        page.validate()?;
        let post_id = post_id.to_string();
        self.client
            .read(
                query_key!["comments", &post_id, page.page, page.limit],
                THREAD,
                move |t| async move { api::list_comments(&t, &post_id, page).await },
            )
            .await
    }

    /// Moderator queue of reported comments.
    pub async fn reported(&self, page: PageRequest) -> ClientResult<Arc<CommentPage>> {
        page.validate()?;
        self.client
            .read(
                query_key!["comments", "reported", page.page, page.limit],
                REPORTED,
                move |t| async move { api::reported_comments(&t, page).await },
            )
            .await
    }

    pub async fn total_count(&self) -> ClientResult<Arc<Count>> {
        self.client
            .read(query_key!["comments", "total"], TOTAL, |t| async move {
                api::total_comment_count(&t).await
            })
            .await
    }

    pub async fn add(&self, post_id: &str, comment: &NewComment) -> ClientResult<Comment> {
        self.client
            .cache()
            .mutate(
                &thread_keys(post_id),
                api::add_comment(self.client.transport(), post_id, comment),
            )
            .await
    }

    pub async fn delete(&self, post_id: &str, comment_id: &str) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(
                &thread_keys(post_id),
                api::delete_comment(self.client.transport(), post_id, comment_id),
            )
            .await
    }

    pub async fn report(
        &self,
        post_id: &str,
        comment_id: &str,
        feedback: ReportFeedback,
    ) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(
                &[
                    query_key!["comments", post_id],
                    query_key!["comments", "reported"],
                    query_key!["posts", "stats"],
                ],
                api::report_comment(self.client.transport(), post_id, comment_id, feedback),
            )
            .await
    }

    /// Dismiss, resolve or delete a reported comment.
    pub async fn moderate(&self, comment_id: &str, action: ModerationAction) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(
                &[query_key!["comments"], query_key!["posts", "stats"]],
                api::moderate_comment(self.client.transport(), comment_id, action),
            )
            .await
    }
}
