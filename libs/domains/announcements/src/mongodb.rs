//! MongoDB implementation of AnnouncementRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::AnnouncementResult;
use crate::models::{Announcement, AnnouncementFilter};
use crate::repository::AnnouncementRepository;

pub const COLLECTION: &str = "announcements";

pub struct MongoAnnouncementRepository {
    collection: Collection<Announcement>,
}

impl MongoAnnouncementRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Announcement>(collection_name);
        Self { collection }
    }

    fn by_id(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    fn list_filter(filter: &AnnouncementFilter) -> Document {
        match filter.customer_id {
            Some(owner) => doc! { "customer_id": owner.to_string() },
            None => doc! {},
        }
    }

    pub async fn init_indexes(&self) -> AnnouncementResult<()> {
        let named = |name: &str| IndexOptions::builder().name(name.to_string()).build();

        let models = vec![
            IndexModel::builder()
                .keys(doc! { "customer_id": 1, "scheduled_time": 1 })
                .options(named("idx_customer_schedule"))
                .build(),
            IndexModel::builder()
                .keys(doc! { "scheduled_time": 1 })
                .options(named("idx_scheduled_time"))
                .build(),
        ];

        self.collection.create_indexes(models).await?;
        tracing::info!(collection = COLLECTION, "Announcement indexes initialized");
        Ok(())
    }
}

#[async_trait]
impl AnnouncementRepository for MongoAnnouncementRepository {
    #[instrument(skip(self, announcement), fields(announcement_id = %announcement.id))]
    async fn create(&self, announcement: Announcement) -> AnnouncementResult<Announcement> {
        self.collection.insert_one(&announcement).await?;
        Ok(announcement)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AnnouncementResult<Option<Announcement>> {
        Ok(self.collection.find_one(Self::by_id(id)).await?)
    }

    #[instrument(skip(self, announcement), fields(announcement_id = %announcement.id))]
    async fn update(&self, announcement: Announcement) -> AnnouncementResult<Option<Announcement>> {
        Ok(self
            .collection
            .find_one_and_replace(Self::by_id(announcement.id), &announcement)
            .return_document(ReturnDocument::After)
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AnnouncementResult<bool> {
        let result = self.collection.delete_one(Self::by_id(id)).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: AnnouncementFilter) -> AnnouncementResult<Vec<Announcement>> {
        let options = FindOptions::builder()
            .limit(filter.page_size())
            .skip(filter.offset)
            .sort(doc! { "scheduled_time": 1 })
            .build();

        let cursor = self
            .collection
            .find(Self::list_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filter() {
        assert_eq!(
            MongoAnnouncementRepository::list_filter(&AnnouncementFilter::default()),
            doc! {}
        );

        let owner = Uuid::now_v7();
        let filter = AnnouncementFilter {
            customer_id: Some(owner),
            ..Default::default()
        };
        assert_eq!(
            MongoAnnouncementRepository::list_filter(&filter),
            doc! { "customer_id": owner.to_string() }
        );
    }
}
