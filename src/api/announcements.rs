//! Announcement API endpoints.

use crate::errors::{require, ClientResult};
use crate::models::{
    Ack, Announcement, AnnouncementPage, AnnouncementUpdate, Count, NewAnnouncement,
    NotificationList, PageRequest,
};
use crate::transport::{ApiRequest, Transport};

/// GET /announcements
pub async fn list_announcements(
    transport: &Transport,
    page: PageRequest,
) -> ClientResult<AnnouncementPage> {
    page.validate()?;

    let request = ApiRequest::get("announcements")
        .query("page", page.page)
        .query("limit", page.limit);
    transport.credentialed().send(request).await
}

/// GET /announcements/count - Polled for the header badge.
pub async fn announcement_count(transport: &Transport) -> ClientResult<Count> {
    transport
        .credentialed()
        .send(ApiRequest::get("announcements").segment("count"))
        .await
}

/// POST /announcements
pub async fn create_announcement(
    transport: &Transport,
    announcement: &NewAnnouncement,
) -> ClientResult<Announcement> {
    announcement.validate()?;

    let request = ApiRequest::post("announcements").json(announcement)?;
    transport.credentialed().send(request).await
}

/// PUT /announcements/:id
pub async fn update_announcement(
    transport: &Transport,
    announcement_id: &str,
    update: &AnnouncementUpdate,
) -> ClientResult<Announcement> {
    require(announcement_id, "Announcement ID")?;
    update.validate()?;

    let request = ApiRequest::put("announcements")
        .segment(announcement_id)
        .json(update)?;
    transport.credentialed().send(request).await
}

/// DELETE /announcements/:id
pub async fn delete_announcement(transport: &Transport, announcement_id: &str) -> ClientResult<Ack> {
    require(announcement_id, "Announcement ID")?;

    transport
        .credentialed()
        .send(ApiRequest::delete("announcements").segment(announcement_id))
        .await
}

/// POST /announcements/test - Seed sample announcements on a development backend.
pub async fn add_sample_announcements(transport: &Transport) -> ClientResult<Ack> {
    transport
        .credentialed()
        .send(ApiRequest::post("announcements").segment("test"))
        .await
}

/// GET /notifications/announcements - The dashboard notification feed.
pub async fn notifications(transport: &Transport) -> ClientResult<NotificationList> {
    transport
        .credentialed()
        .send(ApiRequest::get("notifications").segment("announcements"))
        .await
}
