use async_trait::async_trait;
use database::mongodb::DuplicateKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CustomerError, CustomerResult};
use crate::models::{CreateCustomer, Customer, CustomerFilter, OAuthProviderKind, UpdateCustomer};

/// Names of the unique indexes on the `customers` collection.
///
/// Duplicate-key failures are matched on these names, so every store must
/// report violations with them.
pub mod indexes {
    pub const EMAIL: &str = "email_unique";
    pub const ORG_HANDLE: &str = "org_handle_unique";
    pub const PHONE: &str = "phone_unique";
    /// Multikey over `oauth_providers.identity`
    pub const OAUTH_IDENTITY: &str = "oauth_identity_unique";
}

/// Repository trait for Customer persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a new customer. Unique index violations surface as
    /// [`CustomerError::Duplicate`].
    async fn create(&self, customer: Customer) -> CustomerResult<Customer>;

    async fn find_by_id(&self, id: Uuid) -> CustomerResult<Option<Customer>>;

    /// Find the customer holding the `(provider, provider_id)` identity
    async fn find_by_provider(
        &self,
        provider: OAuthProviderKind,
        provider_id: &str,
    ) -> CustomerResult<Option<Customer>>;

    /// Apply the present fields of `changes` and return the new state, or
    /// `None` when no such customer exists. `account_setup_complete` is
    /// recomputed from the stored result.
    async fn update(&self, id: Uuid, changes: UpdateCustomer) -> CustomerResult<Option<Customer>>;

    /// Fill in the profile of a customer that has none yet. `None` when the
    /// customer is missing or already has a profile.
    async fn set_profile(
        &self,
        id: Uuid,
        profile: CreateCustomer,
    ) -> CustomerResult<Option<Customer>>;

    /// Delete by id; `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> CustomerResult<bool>;

    async fn list(&self, filter: CustomerFilter) -> CustomerResult<Vec<Customer>>;
}

/// In-memory implementation of CustomerRepository, for tests and local runs.
///
/// Uniqueness is checked and the write applied under one write lock, so
/// concurrent creates for the same identity resolve to a single customer.
#[derive(Clone, Default)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The unique index `candidate` would violate against `existing`, if any.
fn conflicting_index(existing: &Customer, candidate: &Customer) -> Option<&'static str> {
    let same = |a: &Option<String>, b: &Option<String>| a.is_some() && a == b;

    if candidate
        .oauth_providers
        .iter()
        .any(|link| existing.has_identity(link.provider, &link.provider_id))
    {
        return Some(indexes::OAUTH_IDENTITY);
    }
    if same(&existing.email, &candidate.email) {
        return Some(indexes::EMAIL);
    }
    if same(&existing.org_handle, &candidate.org_handle) {
        return Some(indexes::ORG_HANDLE);
    }
    if same(&existing.phone, &candidate.phone) {
        return Some(indexes::PHONE);
    }
    None
}

fn check_unique(store: &HashMap<Uuid, Customer>, candidate: &Customer) -> CustomerResult<()> {
    let conflict = store
        .values()
        .filter(|existing| existing.id != candidate.id)
        .find_map(|existing| conflicting_index(existing, candidate));

    match conflict {
        Some(index) => Err(CustomerError::Duplicate(DuplicateKey {
            index: Some(index.to_string()),
        })),
        None => Ok(()),
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, customer: Customer) -> CustomerResult<Customer> {
        let mut customers = self.customers.write().await;
        check_unique(&customers, &customer)?;
        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: Uuid) -> CustomerResult<Option<Customer>> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id).cloned())
    }

    async fn find_by_provider(
        &self,
        provider: OAuthProviderKind,
        provider_id: &str,
    ) -> CustomerResult<Option<Customer>> {
        let customers = self.customers.read().await;
        Ok(customers
            .values()
            .find(|c| c.has_identity(provider, provider_id))
            .cloned())
    }

    async fn update(&self, id: Uuid, changes: UpdateCustomer) -> CustomerResult<Option<Customer>> {
        let mut customers = self.customers.write().await;
        let Some(mut customer) = customers.get(&id).cloned() else {
            return Ok(None);
        };
        customer.apply_update(changes);
        check_unique(&customers, &customer)?;
        customers.insert(id, customer.clone());
        Ok(Some(customer))
    }

    async fn set_profile(
        &self,
        id: Uuid,
        profile: CreateCustomer,
    ) -> CustomerResult<Option<Customer>> {
        let mut customers = self.customers.write().await;
        let Some(mut customer) = customers.get(&id).filter(|c| !c.has_profile()).cloned() else {
            return Ok(None);
        };
        customer.apply_profile(profile);
        check_unique(&customers, &customer)?;
        customers.insert(id, customer.clone());
        Ok(Some(customer))
    }

    async fn delete(&self, id: Uuid) -> CustomerResult<bool> {
        let mut customers = self.customers.write().await;
        Ok(customers.remove(&id).is_some())
    }

    async fn list(&self, filter: CustomerFilter) -> CustomerResult<Vec<Customer>> {
        let customers = self.customers.read().await;
        let mut all: Vec<Customer> = customers.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(all
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.page_size() as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OAuthLink;

    fn github_customer(provider_id: &str, email: Option<&str>) -> Customer {
        Customer::with_identity(
            email.map(str::to_string),
            OAuthLink::new(OAuthProviderKind::Github, provider_id),
        )
    }

    fn profile(handle: &str) -> CreateCustomer {
        CreateCustomer {
            org_name: "Acme".to_string(),
            org_handle: handle.to_string(),
            timezone: "UTC".to_string(),
            email: None,
            phone: None,
            marketing_consent: false,
        }
    }

    fn duplicate_index(err: CustomerError) -> Option<String> {
        match err {
            CustomerError::Duplicate(dup) => dup.index,
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryCustomerRepository::new();
        let customer = repo.create(github_customer("1", None)).await.unwrap();

        let by_id = repo.find_by_id(customer.id).await.unwrap();
        assert_eq!(by_id.as_ref().map(|c| c.id), Some(customer.id));

        let by_provider = repo
            .find_by_provider(OAuthProviderKind::Github, "1")
            .await
            .unwrap();
        assert_eq!(by_provider.map(|c| c.id), Some(customer.id));

        let other_provider = repo
            .find_by_provider(OAuthProviderKind::Google, "1")
            .await
            .unwrap();
        assert!(other_provider.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_identity_rejected() {
        let repo = InMemoryCustomerRepository::new();
        repo.create(github_customer("1", None)).await.unwrap();

        let err = repo.create(github_customer("1", None)).await.unwrap_err();
        assert_eq!(duplicate_index(err).as_deref(), Some(indexes::OAUTH_IDENTITY));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryCustomerRepository::new();
        repo.create(github_customer("1", Some("a@example.com")))
            .await
            .unwrap();

        let err = repo
            .create(github_customer("2", Some("a@example.com")))
            .await
            .unwrap_err();
        assert_eq!(duplicate_index(err).as_deref(), Some(indexes::EMAIL));
    }

    #[tokio::test]
    async fn test_missing_emails_do_not_collide() {
        let repo = InMemoryCustomerRepository::new();
        repo.create(github_customer("1", None)).await.unwrap();
        repo.create(github_customer("2", None)).await.unwrap();

        assert_eq!(repo.list(CustomerFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = InMemoryCustomerRepository::new();
        let updated = repo
            .update(Uuid::now_v7(), UpdateCustomer::default())
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_own_values() {
        let repo = InMemoryCustomerRepository::new();
        let customer = repo
            .create(github_customer("1", Some("a@example.com")))
            .await
            .unwrap();

        let changes = UpdateCustomer {
            org_name: Some("Acme".to_string()),
            email: Some("a@example.com".to_string()),
            ..Default::default()
        };
        let updated = repo.update(customer.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.org_name.as_deref(), Some("Acme"));
        assert_eq!(updated.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_both_fields() {
        let repo = InMemoryCustomerRepository::new();
        let customer = repo.create(github_customer("1", None)).await.unwrap();

        let name = UpdateCustomer {
            org_name: Some("Acme".to_string()),
            ..Default::default()
        };
        let phone = UpdateCustomer {
            phone: Some("+4915112345678".to_string()),
            ..Default::default()
        };
        let (a, b) = tokio::join!(repo.update(customer.id, name), repo.update(customer.id, phone));
        a.unwrap();
        b.unwrap();

        let stored = repo.find_by_id(customer.id).await.unwrap().unwrap();
        assert_eq!(stored.org_name.as_deref(), Some("Acme"));
        assert_eq!(stored.phone.as_deref(), Some("+4915112345678"));
    }

    #[tokio::test]
    async fn test_set_profile_only_once() {
        let repo = InMemoryCustomerRepository::new();
        let customer = repo
            .create(github_customer("1", Some("octo@github.user")))
            .await
            .unwrap();

        let first = repo.set_profile(customer.id, profile("acme")).await.unwrap();
        let first = first.unwrap();
        assert_eq!(first.org_handle.as_deref(), Some("acme"));
        assert!(first.account_setup_complete);

        let second = repo.set_profile(customer.id, profile("other")).await.unwrap();
        assert!(second.is_none());
        assert!(repo
            .set_profile(Uuid::now_v7(), profile("ghost"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_set_profile_rejects_taken_handle() {
        let repo = InMemoryCustomerRepository::new();
        let first = repo.create(github_customer("1", None)).await.unwrap();
        let second = repo.create(github_customer("2", None)).await.unwrap();
        repo.set_profile(first.id, profile("acme")).await.unwrap();

        let err = repo.set_profile(second.id, profile("acme")).await.unwrap_err();
        assert_eq!(duplicate_index(err).as_deref(), Some(indexes::ORG_HANDLE));
    }

    #[tokio::test]
    async fn test_list_clamps_negative_limit() {
        let repo = InMemoryCustomerRepository::new();
        repo.create(github_customer("1", None)).await.unwrap();
        repo.create(github_customer("2", None)).await.unwrap();

        let page = repo
            .list(CustomerFilter {
                limit: -1,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryCustomerRepository::new();
        let customer = repo.create(github_customer("1", None)).await.unwrap();

        assert!(repo.delete(customer.id).await.unwrap());
        assert!(!repo.delete(customer.id).await.unwrap());
        assert!(repo.find_by_id(customer.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let repo = InMemoryCustomerRepository::new();
        for i in 0..5 {
            repo.create(github_customer(&i.to_string(), None))
                .await
                .unwrap();
        }

        let page = repo
            .list(CustomerFilter {
                limit: 2,
                offset: 4,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_converge() {
        let repo = InMemoryCustomerRepository::new();
        let attempts = (0..8).map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create(github_customer("race", None)).await })
        });

        let mut created = 0;
        for handle in attempts {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }
}
