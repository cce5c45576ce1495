//! Cache keys: ordered tuples of resource name, sub-resource and parameters.

use std::fmt;

/// One element of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Str(String),
    Int(i64),
    Flag(bool),
    /// Placeholder for an absent optional parameter.
    Missing,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Str(s) => f.write_str(s),
            KeyPart::Int(i) => write!(f, "{}", i),
            KeyPart::Flag(b) => write!(f, "{}", b),
            KeyPart::Missing => f.write_str("-"),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        KeyPart::Str(value.clone())
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::Int(i64::from(value))
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Flag(value)
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyPart::Missing, Into::into)
    }
}

/// Deterministic identity of a cached query.
///
/// Keys compare element-wise, and invalidation works on prefixes:
/// `posts/all` covers `posts/all/1/10/newest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(root: impl Into<KeyPart>) -> Self {
        Self(vec![root.into()])
    }

    /// Append a part.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// Build a [`QueryKey`] from a root and any number of parts.
///
/// ```
/// use forum_client::query_key;
///
/// let key = query_key!["posts", "all", 1u32, 10u32, "newest"];
/// assert_eq!(key.to_string(), "posts/all/1/10/newest");
/// ```
#[macro_export]
macro_rules! query_key {
    ($root:expr $(, $part:expr)* $(,)?) => {
        $crate::cache::QueryKey::new($root)$(.with($part))*
    };
}
