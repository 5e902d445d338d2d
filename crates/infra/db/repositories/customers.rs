use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        entities::customers::{CustomerEntity, CustomerExpand},
        repositories::{account_customers::AccountCustomerRepository, customers::CustomerRepository},
        value_objects::addresses::BillingAddressUpdate,
    },
    payments::stripe::StripeClient,
};

/// Resolves customers through the `account_customers` mapping, then the provider.
pub struct StripeCustomerPostgres {
    account_customers: Arc<dyn AccountCustomerRepository>,
    stripe_client: Arc<StripeClient>,
}

impl StripeCustomerPostgres {
    pub fn new(
        account_customers: Arc<dyn AccountCustomerRepository>,
        stripe_client: Arc<StripeClient>,
    ) -> Self {
        Self {
            account_customers,
            stripe_client,
        }
    }
}

#[async_trait]
impl CustomerRepository for StripeCustomerPostgres {
    async fn fetch_customer(
        &self,
        uid: &str,
        expand: Vec<CustomerExpand>,
    ) -> Result<Option<CustomerEntity>> {
        let Some(customer_id) = self
            .account_customers
            .find_by_uid(uid)
            .await?
            .and_then(|row| row.stripe_customer_id)
        else {
            debug!(%uid, "customers: no stripe customer on record");
            return Ok(None);
        };

        self.stripe_client
            .retrieve_customer(&customer_id, &expand)
            .await
    }

    async fn create_plain_customer(
        &self,
        uid: &str,
        email: &str,
        display_name: Option<String>,
        idempotency_key: &str,
        client_address: Option<String>,
    ) -> Result<CustomerEntity> {
        let customer = self
            .stripe_client
            .create_customer(uid, email, display_name, idempotency_key, client_address)
            .await?;

        self.account_customers
            .upsert_stripe_customer_id(uid, &customer.id)
            .await?;

        info!(%uid, customer_id = %customer.id, "customers: customer recorded");
        Ok(customer)
    }

    async fn update_customer_paypal_agreement(
        &self,
        customer: &CustomerEntity,
        agreement_id: &str,
    ) -> Result<CustomerEntity> {
        let updated = self
            .stripe_client
            .update_paypal_agreement(&customer.id, agreement_id)
            .await?;

        // The metadata update does not expand subscriptions; keep the ones already loaded.
        Ok(CustomerEntity {
            subscriptions: customer.subscriptions.clone(),
            ..updated
        })
    }

    async fn update_customer_billing_address(
        &self,
        customer_id: &str,
        address: &BillingAddressUpdate,
    ) -> Result<()> {
        self.stripe_client
            .update_billing_address(customer_id, address)
            .await
    }

    async fn set_customer_location(
        &self,
        customer_id: &str,
        country: &str,
        postal_code: &str,
    ) -> Result<bool> {
        self.stripe_client
            .set_location(customer_id, country, postal_code)
            .await
    }

    async fn add_tax_id_to_customer(&self, customer: &CustomerEntity, currency: &str) -> Result<()> {
        self.stripe_client.add_tax_id(customer, currency).await
    }

    async fn update_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<CustomerEntity> {
        self.stripe_client
            .set_default_payment_method(customer_id, payment_method_id)
            .await
    }

    async fn remove_sources(&self, customer_id: &str) -> Result<()> {
        self.stripe_client.remove_customer_sources(customer_id).await
    }
}
