use std::sync::Arc;

use crate::api::tags as api;
use crate::cache::QueryOptions;
use crate::client::ForumClient;
use crate::errors::ClientResult;
use crate::models::{Ack, TagSet};
use crate::query_key;

const TAGS: QueryOptions = QueryOptions::minutes(30);

pub struct TagQueries<'a> {
    client: &'a ForumClient,
}

impl<'a> TagQueries<'a> {
    pub(crate) fn new(client: &'a ForumClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Arc<TagSet>> {
        self.client
            .read(query_key!["tags"], TAGS, |t| async move {
                api::list_tags(&t).await
            })
            .await
    }

    pub async fn add(&self, name: &str) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(&[query_key!["tags"]], api::add_tag(self.client.transport(), name))
            .await
    }

    pub async fn remove(&self, name: &str) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(
                &[query_key!["tags"]],
                api::remove_tag(self.client.transport(), name),
            )
            .await
    }
}
