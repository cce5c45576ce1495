//! Comment model, reports and moderation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Pagination;
use crate::errors::{require, require_email, ClientResult};

/// Moderation status of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Active,
    Reported,
    Resolved,
    Dismissed,
}

/// Reason picked by the reporter; the backend stores the display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportFeedback {
    #[serde(rename = "Spam or irrelevant")]
    Spam,
    #[serde(rename = "Offensive or abusive")]
    Offensive,
    #[serde(rename = "Other (needs review)")]
    Other,
}

impl ReportFeedback {
    pub const ALL: [ReportFeedback; 3] = [
        ReportFeedback::Spam,
        ReportFeedback::Offensive,
        ReportFeedback::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFeedback::Spam => "Spam or irrelevant",
            ReportFeedback::Offensive => "Offensive or abusive",
            ReportFeedback::Other => "Other (needs review)",
        }
    }
}

/// Decision a moderator takes on a reported comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Dismiss,
    Resolve,
    Delete,
}

/// One report filed against a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReport {
    #[serde(default)]
    pub email: String,
    pub feedback: ReportFeedback,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
}

/// A comment under a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub post_id: String,
    #[serde(default)]
    pub email: String,
    pub text: String,
    #[serde(default)]
    pub reports: Vec<CommentReport>,
    #[serde(default)]
    pub status: CommentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Only filled in the reported-comments listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_title: Option<String>,
}

impl Comment {
    pub fn is_reported(&self) -> bool {
        !self.reports.is_empty() || self.status == CommentStatus::Reported
    }
}

/// One page of comments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Request body for adding a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub email: String,
    pub text: String,
}

impl NewComment {
    pub fn validate(&self) -> ClientResult<()> {
        require_email(&self.email)?;
        require(&self.text, "Comment text")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_feedback_wire_text() {
        let json = serde_json::to_string(&ReportFeedback::Offensive).unwrap();
        assert_eq!(json, "\"Offensive or abusive\"");

        for feedback in ReportFeedback::ALL {
            let back: ReportFeedback =
                serde_json::from_value(serde_json::Value::from(feedback.as_str())).unwrap();
            assert_eq!(back, feedback);
        }
    }

    #[test]
    fn test_comment_with_reports() {
        let comment: Comment = serde_json::from_str(
            r#"{
                "_id": "c1",
                "postId": "p1",
                "email": "bob@example.com",
                "text": "buy cheap watches",
                "reports": [
                    {"email": "ada@example.com", "feedback": "Spam or irrelevant", "reportedAt": "2024-01-19T15:45:00Z"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(comment.status, CommentStatus::Active);
        assert!(comment.is_reported());
        assert_eq!(comment.reports[0].feedback, ReportFeedback::Spam);
    }
}
