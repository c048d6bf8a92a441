//! MongoDB implementation of CustomerRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use chrono::Utc;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_bson},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CustomerError, CustomerResult};
use crate::models::{
    CreateCustomer, Customer, CustomerFilter, OAuthProviderKind, UpdateCustomer,
    identity_key, is_account_setup_complete,
};
use crate::repository::{CustomerRepository, indexes};

pub const COLLECTION: &str = "customers";

/// MongoDB implementation of the CustomerRepository
pub struct MongoCustomerRepository {
    collection: Collection<Customer>,
}

impl MongoCustomerRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Customer>(collection_name);
        Self { collection }
    }

    fn by_id(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    fn by_identity(provider: OAuthProviderKind, provider_id: &str) -> Document {
        doc! { "oauth_providers.identity": identity_key(provider, provider_id) }
    }

    /// `$set` for the present fields of `changes`, stamped with `updated_at`.
    fn set_changes(changes: &UpdateCustomer) -> CustomerResult<Document> {
        let mut set = doc! { "updated_at": to_bson(&Utc::now())? };
        let fields = [
            ("org_name", &changes.org_name),
            ("org_handle", &changes.org_handle),
            ("timezone", &changes.timezone),
            ("email", &changes.email),
            ("phone", &changes.phone),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                set.insert(field, value.as_str());
            }
        }
        if let Some(consent) = changes.marketing_consent {
            set.insert("marketing_consent", consent);
        }
        Ok(doc! { "$set": set })
    }

    async fn apply_changes(
        &self,
        filter: Document,
        changes: &UpdateCustomer,
    ) -> CustomerResult<Option<Customer>> {
        let updated = self
            .collection
            .find_one_and_update(filter, Self::set_changes(changes)?)
            .return_document(ReturnDocument::After)
            .await
            .map_err(CustomerError::from_write)?;

        match updated {
            Some(customer) => Ok(Some(self.sync_setup_status(customer).await?)),
            None => Ok(None),
        }
    }

    /// Store the setup flag derived from `customer`, unless a later write has
    /// already replaced this version (that writer syncs the flag itself).
    async fn sync_setup_status(&self, mut customer: Customer) -> CustomerResult<Customer> {
        let complete = is_account_setup_complete(&customer);
        if complete != customer.account_setup_complete {
            let mut version = Self::by_id(customer.id);
            version.insert("updated_at", to_bson(&customer.updated_at)?);
            self.collection
                .update_one(version, doc! { "$set": { "account_setup_complete": complete } })
                .await?;
            customer.account_setup_complete = complete;
        }
        Ok(customer)
    }

    /// Create the unique indexes the identity flow relies on.
    ///
    /// Safe to call on every start; existing indexes with the same keys and options are
    /// left alone.
    pub async fn init_indexes(&self) -> CustomerResult<()> {
        let sparse_unique = |name: &str| {
            IndexOptions::builder()
                .unique(true)
                .sparse(true)
                .name(name.to_string())
                .build()
        };

        let models = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(sparse_unique(indexes::EMAIL))
                .build(),
            IndexModel::builder()
                .keys(doc! { "org_handle": 1 })
                .options(sparse_unique(indexes::ORG_HANDLE))
                .build(),
            IndexModel::builder()
                .keys(doc! { "phone": 1 })
                .options(sparse_unique(indexes::PHONE))
                .build(),
            // Single-field multikey: one key per link, so a customer's own
            // links never pair up across providers. Customers without links
            // must not collide on a missing identity.
            IndexModel::builder()
                .keys(doc! { "oauth_providers.identity": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(
                            doc! { "oauth_providers.identity": { "$exists": true } },
                        )
                        .name(indexes::OAUTH_IDENTITY.to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(models).await?;
        tracing::info!(collection = COLLECTION, "Customer indexes initialized");
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for MongoCustomerRepository {
    #[instrument(skip(self, customer), fields(customer_id = %customer.id))]
    async fn create(&self, customer: Customer) -> CustomerResult<Customer> {
        self.collection
            .insert_one(&customer)
            .await
            .map_err(CustomerError::from_write)?;

        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> CustomerResult<Option<Customer>> {
        Ok(self.collection.find_one(Self::by_id(id)).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_provider(
        &self,
        provider: OAuthProviderKind,
        provider_id: &str,
    ) -> CustomerResult<Option<Customer>> {
        Ok(self
            .collection
            .find_one(Self::by_identity(provider, provider_id))
            .await?)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: UpdateCustomer) -> CustomerResult<Option<Customer>> {
        let updated = self.apply_changes(Self::by_id(id), &changes).await?;

        if updated.is_some() {
            tracing::info!(customer_id = %id, "Customer updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self, profile))]
    async fn set_profile(
        &self,
        id: Uuid,
        profile: CreateCustomer,
    ) -> CustomerResult<Option<Customer>> {
        let mut without_profile = Self::by_id(id);
        without_profile.insert("org_handle", doc! { "$exists": false });

        let updated = self
            .apply_changes(without_profile, &UpdateCustomer::from(profile))
            .await?;

        if updated.is_some() {
            tracing::info!(customer_id = %id, "Customer profile created");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CustomerResult<bool> {
        let result = self.collection.delete_one(Self::by_id(id)).await?;

        if result.deleted_count > 0 {
            tracing::info!(customer_id = %id, "Customer deleted");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: CustomerFilter) -> CustomerResult<Vec<Customer>> {
        let options = FindOptions::builder()
            .limit(filter.page_size())
            .skip(filter.offset)
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }
}
