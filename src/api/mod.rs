//! REST resource modules.
//!
//! One function per backend endpoint. Each validates its arguments, builds a
//! typed [`ApiRequest`](crate::transport::ApiRequest), sends it through the
//! [`Transport`](crate::transport::Transport) and returns the parsed body
//! unchanged. Nothing here catches errors or touches the cache.

pub mod announcements;
pub mod auth;
pub mod comments;
pub mod payments;
pub mod posts;
pub mod tags;
pub mod users;
