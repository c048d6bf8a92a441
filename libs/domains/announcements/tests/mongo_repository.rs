//! MongoDB repository tests. Run with `cargo test -- --ignored` (requires Docker).

use chrono::{Duration, Utc};
use domain_announcements::{
    Announcement, AnnouncementFilter, AnnouncementRepository, CreateAnnouncement,
    MongoAnnouncementRepository, UpdateAnnouncement,
};
use test_utils::{TestDataBuilder, TestMongo};
use uuid::Uuid;

fn announcement(owner: Uuid, content: &str, in_minutes: i64) -> Announcement {
    Announcement::new(CreateAnnouncement {
        customer_id: owner,
        content: content.to_string(),
        scheduled_time: Utc::now() + Duration::minutes(in_minutes),
        is_sent: false,
    })
}

async fn repository(mongo: &TestMongo, builder: &TestDataBuilder) -> MongoAnnouncementRepository {
    let repository = MongoAnnouncementRepository::new(&mongo.database(&builder.database_name()));
    repository.init_indexes().await.unwrap();
    repository
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_is_soonest_first_and_filters_by_owner() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("announcements_list_order");
    let repository = repository(&mongo, &builder).await;

    let owner = Uuid::now_v7();
    let other = Uuid::now_v7();
    repository.create(announcement(owner, "later", 120)).await.unwrap();
    repository.create(announcement(owner, "sooner", 30)).await.unwrap();
    repository.create(announcement(other, "not mine", 10)).await.unwrap();

    let mine = repository
        .list(AnnouncementFilter {
            customer_id: Some(owner),
            ..Default::default()
        })
        .await
        .unwrap();
    let contents: Vec<&str> = mine.iter().map(|a| a.content.as_str()).collect();
    assert_eq!(contents, vec!["sooner", "later"]);

    let all = repository.list(AnnouncementFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].content, "not mine");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_delete() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("announcements_update_delete");
    let repository = repository(&mongo, &builder).await;

    let mut stored = repository
        .create(announcement(Uuid::now_v7(), "draft", 60))
        .await
        .unwrap();
    stored.apply_update(UpdateAnnouncement {
        is_sent: Some(true),
        ..Default::default()
    });

    let updated = repository.update(stored.clone()).await.unwrap().unwrap();
    assert!(updated.is_sent);
    assert_eq!(updated.customer_id, stored.customer_id);

    assert!(repository.delete(stored.id).await.unwrap());
    assert!(!repository.delete(stored.id).await.unwrap());
    assert!(repository.find_by_id(stored.id).await.unwrap().is_none());
    assert!(repository.update(stored).await.unwrap().is_none());
}
