//! Data models for the forum backend.
//!
//! Field names follow the backend's JSON (camelCase, Mongo-style `_id`).

mod announcement;
mod comment;
mod pagination;
mod payment;
mod post;
mod tag;
mod user;

pub use announcement::*;
pub use comment::*;
pub use pagination::*;
pub use payment::*;
pub use post::*;
pub use tag::*;
pub use user::*;
