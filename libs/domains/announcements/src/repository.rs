use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AnnouncementResult;
use crate::models::{Announcement, AnnouncementFilter};

/// Repository trait for Announcement persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: Announcement) -> AnnouncementResult<Announcement>;

    async fn find_by_id(&self, id: Uuid) -> AnnouncementResult<Option<Announcement>>;

    /// Replace the stored announcement; `None` when it no longer exists
    async fn update(&self, announcement: Announcement) -> AnnouncementResult<Option<Announcement>>;

    async fn delete(&self, id: Uuid) -> AnnouncementResult<bool>;

    /// Soonest scheduled first
    async fn list(&self, filter: AnnouncementFilter) -> AnnouncementResult<Vec<Announcement>>;
}

/// In-memory implementation of AnnouncementRepository
#[derive(Clone, Default)]
pub struct InMemoryAnnouncementRepository {
    announcements: Arc<RwLock<HashMap<Uuid, Announcement>>>,
}

impl InMemoryAnnouncementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnouncementRepository for InMemoryAnnouncementRepository {
    async fn create(&self, announcement: Announcement) -> AnnouncementResult<Announcement> {
        let mut announcements = self.announcements.write().await;
        announcements.insert(announcement.id, announcement.clone());
        Ok(announcement)
    }

    async fn find_by_id(&self, id: Uuid) -> AnnouncementResult<Option<Announcement>> {
        let announcements = self.announcements.read().await;
        Ok(announcements.get(&id).cloned())
    }

    async fn update(&self, announcement: Announcement) -> AnnouncementResult<Option<Announcement>> {
        let mut announcements = self.announcements.write().await;
        match announcements.get_mut(&announcement.id) {
            Some(existing) => {
                *existing = announcement.clone();
                Ok(Some(announcement))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> AnnouncementResult<bool> {
        let mut announcements = self.announcements.write().await;
        Ok(announcements.remove(&id).is_some())
    }

    async fn list(&self, filter: AnnouncementFilter) -> AnnouncementResult<Vec<Announcement>> {
        let announcements = self.announcements.read().await;
        let mut matching: Vec<Announcement> = announcements
            .values()
            .filter(|a| filter.customer_id.is_none_or(|owner| a.customer_id == owner))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));

        Ok(matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.page_size() as usize)
            .collect())
    }
}
