use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::customers::{CustomerEntity, CustomerExpand},
    value_objects::addresses::BillingAddressUpdate,
};

#[automock]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// `None` when the account has no billing customer yet.
    async fn fetch_customer(
        &self,
        uid: &str,
        expand: Vec<CustomerExpand>,
    ) -> Result<Option<CustomerEntity>>;

    async fn create_plain_customer(
        &self,
        uid: &str,
        email: &str,
        display_name: Option<String>,
        idempotency_key: &str,
        client_address: Option<String>,
    ) -> Result<CustomerEntity>;

    async fn update_customer_paypal_agreement(
        &self,
        customer: &CustomerEntity,
        agreement_id: &str,
    ) -> Result<CustomerEntity>;

    async fn update_customer_billing_address(
        &self,
        customer_id: &str,
        address: &BillingAddressUpdate,
    ) -> Result<()>;

    /// Returns false when the provider could not place the postal code.
    async fn set_customer_location(
        &self,
        customer_id: &str,
        country: &str,
        postal_code: &str,
    ) -> Result<bool>;

    async fn add_tax_id_to_customer(&self, customer: &CustomerEntity, currency: &str)
    -> Result<()>;

    async fn update_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<CustomerEntity>;

    async fn remove_sources(&self, customer_id: &str) -> Result<()>;
}
