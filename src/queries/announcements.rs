use std::sync::Arc;

use crate::api::announcements as api;
use crate::cache::{QueryKey, QueryOptions};
use crate::client::ForumClient;
use crate::errors::ClientResult;
use crate::models::{
    Ack, Announcement, AnnouncementPage, AnnouncementUpdate, Count, NewAnnouncement,
    NotificationList, PageRequest,
};
use crate::query_key;

const LISTING: QueryOptions = QueryOptions::minutes(2);
const COUNT: QueryOptions = QueryOptions::minutes(1);
const FEED: QueryOptions = QueryOptions::minutes(1);

/// Listing, badge count and notification feed.
fn listing_and_count() -> [QueryKey; 3] {
    [
        query_key!["announcements", "all"],
        query_key!["announcements", "count"],
        query_key!["notifications"],
    ]
}

pub struct AnnouncementQueries<'a> {
    client: &'a ForumClient,
}

impl<'a> AnnouncementQueries<'a> {
    pub(crate) fn new(client: &'a ForumClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ClientResult<Arc<AnnouncementPage>> {
        page.validate()?;
        self.client
            .read(
                query_key!["announcements", "all", page.page, page.limit],
                LISTING,
                move |t| async move { api::list_announcements(&t, page).await },
            )
            .await
    }

    /// Number of announcements, shown as the navbar badge.
    pub async fn count(&self) -> ClientResult<Arc<Count>> {
        self.client
            .read(query_key!["announcements", "count"], COUNT, |t| async move {
                api::announcement_count(&t).await
            })
            .await
    }

    pub async fn notifications(&self) -> ClientResult<Arc<NotificationList>> {
        self.client
            .read(query_key!["notifications"], FEED, |t| async move {
                api::notifications(&t).await
            })
            .await
    }

    pub async fn create(&self, announcement: &NewAnnouncement) -> ClientResult<Announcement> {
        self.client
            .cache()
            .mutate(
                &listing_and_count(),
                api::create_announcement(self.client.transport(), announcement),
            )
            .await
    }

    pub async fn update(
        &self,
        announcement_id: &str,
        update: &AnnouncementUpdate,
    ) -> ClientResult<Announcement> {
        self.client
            .cache()
            .mutate(
                &[
                    query_key!["announcements", "all"],
                    query_key!["notifications"],
                ],
                api::update_announcement(self.client.transport(), announcement_id, update),
            )
            .await
    }

    pub async fn delete(&self, announcement_id: &str) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(
                &listing_and_count(),
                api::delete_announcement(self.client.transport(), announcement_id),
            )
            .await
    }

    /// Seed the backend with sample announcements (development only).
    pub async fn add_samples(&self) -> ClientResult<Ack> {
        self.client
            .cache()
            .mutate(
                &listing_and_count(),
                api::add_sample_announcements(self.client.transport()),
            )
            .await
    }
}
