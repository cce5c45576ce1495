//! Tag set model.

use serde::{Deserialize, Serialize};

use crate::errors::{require, ClientResult};

/// The set of category tags posts can carry.
///
/// Deserializes from either a bare array or `{ "tags": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "TagsRepr")]
pub struct TagSet {
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    Bare(Vec<String>),
    Wrapped { tags: Vec<String> },
}

impl From<TagsRepr> for TagSet {
    fn from(repr: TagsRepr) -> Self {
        match repr {
            TagsRepr::Bare(tags) | TagsRepr::Wrapped { tags } => Self { tags },
        }
    }
}

impl TagSet {
    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

/// Request body for adding a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
}

impl NewTag {
    pub fn validate(&self) -> ClientResult<()> {
        require(&self.name, "Tag name")
    }
}
