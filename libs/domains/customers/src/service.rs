//! Customer Service - Business logic layer
//!
//! Mutations take the authenticated actor returned by
//! [`require_authenticated`](crate::gate::require_authenticated); a customer
//! may only change its own record.

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CustomerError, CustomerResult};
use crate::models::{CreateCustomer, Customer, CustomerFilter, UpdateCustomer};
use crate::repository::CustomerRepository;

pub struct CustomerService<R: CustomerRepository> {
    repository: Arc<R>,
}

impl<R: CustomerRepository> CustomerService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn list_customers(&self, filter: CustomerFilter) -> CustomerResult<Vec<Customer>> {
        self.repository.list(filter).await
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: Uuid) -> CustomerResult<Customer> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    /// Create the actor's customer profile. The record itself exists from
    /// the first sign-in; this fills in the organisation details once, and
    /// later changes go through [`Self::update_customer`].
    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn create_customer(
        &self,
        actor: &Customer,
        input: CreateCustomer,
    ) -> CustomerResult<Customer> {
        let input = input.normalized();
        input.validate()?;

        if self.get_customer(actor.id).await?.has_profile() {
            return Err(CustomerError::ProfileExists(actor.id));
        }

        let customer = self
            .repository
            .set_profile(actor.id, input)
            .await?
            .ok_or(CustomerError::ProfileExists(actor.id))?;
        tracing::info!(customer_id = %customer.id, "Customer profile created");
        Ok(customer)
    }

    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn update_customer(
        &self,
        actor: &Customer,
        id: Uuid,
        input: UpdateCustomer,
    ) -> CustomerResult<Customer> {
        ensure_self(actor, id)?;

        let input = input.normalized();
        input.validate()?;

        self.repository
            .update(id, input)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn delete_customer(&self, actor: &Customer, id: Uuid) -> CustomerResult<()> {
        ensure_self(actor, id)?;

        if !self.repository.delete(id).await? {
            return Err(CustomerError::NotFound(id));
        }
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}

fn ensure_self(actor: &Customer, target: Uuid) -> CustomerResult<()> {
    if actor.id != target {
        return Err(CustomerError::Forbidden {
            actor: actor.id,
            target,
        });
    }
    Ok(())
}

impl<R: CustomerRepository> Clone for CustomerService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
