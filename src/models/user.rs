//! User model, roles and badges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PageRequest, Pagination};
use crate::errors::{require_email, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Moderator => "moderator",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    #[default]
    Newcomer,
    ActiveMember,
    Contributor,
    Expert,
    Moderator,
    Admin,
    /// Granted once a membership payment succeeds.
    Gold,
}

impl Badge {
    pub fn description(&self) -> &'static str {
        match self {
            Badge::Newcomer => "Welcome to the community!",
            Badge::ActiveMember => "Active community member",
            Badge::Contributor => "Regular content contributor",
            Badge::Expert => "Knowledge expert in the field",
            Badge::Moderator => "Community moderator",
            Badge::Admin => "Administrator",
            Badge::Gold => "Premium member",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
    Pending,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
            UserStatus::Pending => "pending",
        }
    }
}

/// A registered user, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub badge: Badge,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub post_count: u32,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Moderators and admins can act on reported content.
    pub fn can_moderate(&self) -> bool {
        self.role >= UserRole::Moderator
    }
}

/// Request body sent on every sign-in; the backend upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: String,
    #[serde(default)]
    pub role: UserRole,
}

impl NewUser {
    pub fn validate(&self) -> ClientResult<()> {
        require_email(&self.email)
    }
}

/// `{ success, message, user }` envelope of user writes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// All users; the backend answers with a bare array or `{ users }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "UsersRepr")]
pub struct UserList {
    pub users: Vec<User>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UsersRepr {
    Bare(Vec<User>),
    Wrapped { users: Vec<User> },
}

impl From<UsersRepr> for UserList {
    fn from(repr: UsersRepr) -> Self {
        match repr {
            UsersRepr::Bare(users) | UsersRepr::Wrapped { users } => Self { users },
        }
    }
}

/// One page of users for the admin table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Filters for the paginated user listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct UserQuery {
    pub page: PageRequest,
    pub search: Option<String>,
    pub status: Option<UserStatus>,
}

/// Response of the `/jwt` token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionToken {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
