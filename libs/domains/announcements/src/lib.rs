//! Announcements Domain
//!
//! Short messages a customer schedules for later delivery. Delivery itself
//! is out of scope: `is_sent` is stored and reported, nothing acts on it.
//!
//! Every mutation passes the authorization gate from `domain_customers`
//! before the body is parsed, then an ownership check in the service.
//!
//! ```rust,ignore
//! use domain_announcements::{AnnouncementService, MongoAnnouncementRepository, handlers};
//!
//! let repository = MongoAnnouncementRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let routes = handlers::router(AnnouncementService::new(Arc::new(repository)));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{AnnouncementError, AnnouncementResult};
pub use handlers::ApiDoc;
pub use models::{Announcement, AnnouncementFilter, CreateAnnouncement, UpdateAnnouncement};
pub use self::mongodb::MongoAnnouncementRepository;
pub use repository::{AnnouncementRepository, InMemoryAnnouncementRepository};
pub use service::AnnouncementService;
