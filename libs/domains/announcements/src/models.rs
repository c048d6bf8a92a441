use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_future(scheduled_time: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *scheduled_time <= Utc::now() {
        return Err(ValidationError::new("scheduled_time")
            .with_message(Cow::Borrowed("Scheduled time must be in the future")));
    }
    Ok(())
}

/// Announcement entity - stored in the `announcements` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Announcement {
    #[serde(
        rename = "_id",
        alias = "id",
        with = "database::mongodb::uuid_as_string"
    )]
    pub id: Uuid,
    /// Owning customer
    #[serde(with = "database::mongodb::uuid_as_string")]
    pub customer_id: Uuid,
    pub content: String,
    pub scheduled_time: DateTime<Utc>,
    /// Stored only; nothing delivers announcements yet
    pub is_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(input: CreateAnnouncement) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            customer_id: input.customer_id,
            content: input.content,
            scheduled_time: input.scheduled_time,
            is_sent: input.is_sent,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateAnnouncement) {
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(scheduled_time) = update.scheduled_time {
            self.scheduled_time = scheduled_time;
        }
        if let Some(is_sent) = update.is_sent {
            self.is_sent = is_sent;
        }
        self.updated_at = Utc::now();
    }
}

/// DTO for scheduling an announcement
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncement {
    /// Must be the calling customer
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 160))]
    pub content: String,
    #[validate(custom(function = "validate_future"))]
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub is_sent: bool,
}

impl CreateAnnouncement {
    /// Trim the content; length limits apply to the trimmed text.
    pub fn normalized(self) -> Self {
        Self {
            content: self.content.trim().to_string(),
            ..self
        }
    }
}

/// DTO for updating an announcement. The owner cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncement {
    #[validate(length(min = 1, max = 160))]
    pub content: Option<String>,
    #[validate(custom(function = "validate_future"))]
    pub scheduled_time: Option<DateTime<Utc>>,
    pub is_sent: Option<bool>,
}

impl UpdateAnnouncement {
    pub fn normalized(self) -> Self {
        Self {
            content: self.content.map(|c| c.trim().to_string()),
            ..self
        }
    }
}

/// Query filters for listing announcements
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AnnouncementFilter {
    /// Only announcements owned by this customer
    pub customer_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

/// Largest page a list request may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

impl AnnouncementFilter {
    /// `limit` clamped to `1..=MAX_PAGE_SIZE`
    pub fn page_size(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for AnnouncementFilter {
    fn default() -> Self {
        Self {
            customer_id: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}
