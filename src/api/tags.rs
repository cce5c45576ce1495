//! Tag API endpoints. Served without credentials.

use crate::errors::{require, ClientResult};
use crate::models::{Ack, NewTag, TagSet};
use crate::transport::{ApiRequest, Transport};

/// GET /posts/tags
pub async fn list_tags(transport: &Transport) -> ClientResult<TagSet> {
    transport
        .plain()
        .send(ApiRequest::get("posts").segment("tags"))
        .await
}

/// POST /posts/tags
pub async fn add_tag(transport: &Transport, name: &str) -> ClientResult<Ack> {
    let tag = NewTag {
        name: name.trim().to_string(),
    };
    tag.validate()?;

    let request = ApiRequest::post("posts").segment("tags").json(&tag)?;
    transport.plain().send(request).await
}

/// DELETE /posts/tags/:name
pub async fn remove_tag(transport: &Transport, name: &str) -> ClientResult<Ack> {
    require(name, "Tag name")?;

    let request = ApiRequest::delete("posts").segment("tags").segment(name.trim());
    transport.plain().send(request).await
}
