//! Announcement Service - Business logic layer
//!
//! A customer schedules announcements for itself only, and only the owner
//! may change or remove one.

use domain_customers::Customer;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AnnouncementError, AnnouncementResult};
use crate::models::{Announcement, AnnouncementFilter, CreateAnnouncement, UpdateAnnouncement};
use crate::repository::AnnouncementRepository;

pub struct AnnouncementService<R: AnnouncementRepository> {
    repository: Arc<R>,
}

impl<R: AnnouncementRepository> AnnouncementService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn list_announcements(
        &self,
        filter: AnnouncementFilter,
    ) -> AnnouncementResult<Vec<Announcement>> {
        self.repository.list(filter).await
    }

    #[instrument(skip(self))]
    pub async fn get_announcement(&self, id: Uuid) -> AnnouncementResult<Announcement> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AnnouncementError::NotFound(id))
    }

    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn create_announcement(
        &self,
        actor: &Customer,
        input: CreateAnnouncement,
    ) -> AnnouncementResult<Announcement> {
        ensure_owner(actor, input.customer_id)?;

        let input = input.normalized();
        input.validate()?;

        let announcement = self.repository.create(Announcement::new(input)).await?;
        tracing::info!(announcement_id = %announcement.id, "Announcement scheduled");
        Ok(announcement)
    }

    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn update_announcement(
        &self,
        actor: &Customer,
        id: Uuid,
        input: UpdateAnnouncement,
    ) -> AnnouncementResult<Announcement> {
        let mut announcement = self.get_announcement(id).await?;
        ensure_owner(actor, announcement.customer_id)?;

        let input = input.normalized();
        input.validate()?;
        announcement.apply_update(input);

        self.repository
            .update(announcement)
            .await?
            .ok_or(AnnouncementError::NotFound(id))
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn delete_announcement(&self, actor: &Customer, id: Uuid) -> AnnouncementResult<()> {
        let announcement = self.get_announcement(id).await?;
        ensure_owner(actor, announcement.customer_id)?;

        if !self.repository.delete(id).await? {
            return Err(AnnouncementError::NotFound(id));
        }
        tracing::info!(announcement_id = %id, "Announcement deleted");
        Ok(())
    }
}

fn ensure_owner(actor: &Customer, owner: Uuid) -> AnnouncementResult<()> {
    if actor.id != owner {
        return Err(AnnouncementError::Forbidden {
            actor: actor.id,
            owner,
        });
    }
    Ok(())
}

impl<R: AnnouncementRepository> Clone for AnnouncementService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
