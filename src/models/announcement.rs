//! Announcement model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Pagination;
use crate::errors::{require, ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// An admin announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub author_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of announcements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnouncementPage {
    #[serde(default)]
    pub announcements: Vec<Announcement>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Request body for creating an announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

impl NewAnnouncement {
    pub fn validate(&self) -> ClientResult<()> {
        require(&self.title, "Title")?;
        require(&self.content, "Content")
    }
}

/// Request body for a partial announcement update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnouncementUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl AnnouncementUpdate {
    pub fn validate(&self) -> ClientResult<()> {
        if self.title.is_none() && self.content.is_none() && self.priority.is_none() {
            return Err(ClientError::Validation(
                "Announcement update has no changes".to_string(),
            ));
        }
        if let Some(title) = &self.title {
            require(title, "Title")?;
        }
        if let Some(content) = &self.content {
            require(content, "Content")?;
        }
        Ok(())
    }
}

/// An entry in the signed-in user's notification feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "body")]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The notification feed.
///
/// Deserializes from either a bare array or `{ "announcements": [...] }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "NotificationsRepr")]
pub struct NotificationList {
    #[serde(rename = "announcements")]
    pub notifications: Vec<Notification>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NotificationsRepr {
    Bare(Vec<Notification>),
    Wrapped {
        #[serde(default)]
        announcements: Vec<Notification>,
    },
}

impl From<NotificationsRepr> for NotificationList {
    fn from(repr: NotificationsRepr) -> Self {
        match repr {
            NotificationsRepr::Bare(notifications)
            | NotificationsRepr::Wrapped {
                announcements: notifications,
            } => Self { notifications },
        }
    }
}

impl NotificationList {
    pub fn unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}
