//! Paging parameters and shared response envelopes.

use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, ClientResult};

/// Largest page size the client will ask for.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Page number (1-based) and page size for listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.page == 0 {
            return Err(ClientError::Validation(
                "Page numbers start at 1".to_string(),
            ));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(ClientError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Pagination block returned next to every listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(
        default,
        alias = "totalPosts",
        alias = "totalComments",
        alias = "totalAnnouncements",
        alias = "totalUsers",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_prev_page: Option<bool>,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.has_next_page
            .unwrap_or(self.current_page < self.total_pages)
    }

    pub fn has_prev(&self) -> bool {
        self.has_prev_page.unwrap_or(self.current_page > 1)
    }
}

/// `{ count }` response of the various count endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Count {
    #[serde(default)]
    pub count: u64,
}

/// Generic acknowledgement for writes that return no entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
