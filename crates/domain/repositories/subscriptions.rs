use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::{invoices::InvoiceEntity, subscriptions::SubscriptionEntity},
    value_objects::subscriptions::{NewPaypalSubscription, NewPmiSubscription},
};

#[automock]
#[async_trait]
pub trait SubscriptionLifecycle: Send + Sync {
    /// Charged by the provider during creation; replays of the same idempotency key
    /// return the original subscription.
    async fn create_subscription_with_pmi(
        &self,
        subscription: &NewPmiSubscription,
    ) -> Result<SubscriptionEntity>;

    async fn create_subscription_with_paypal(
        &self,
        subscription: &NewPaypalSubscription,
    ) -> Result<SubscriptionEntity>;

    /// Immediate cancellation.
    async fn cancel_subscription(&self, subscription_id: &str) -> Result<()>;

    async fn set_cancel_at_period_end(
        &self,
        subscription_id: &str,
        cancel_at_period_end: bool,
    ) -> Result<SubscriptionEntity>;

    async fn change_subscription_plan(
        &self,
        subscription: &SubscriptionEntity,
        new_price_id: &str,
    ) -> Result<SubscriptionEntity>;

    async fn retry_invoice_with_payment_id(
        &self,
        customer_id: &str,
        invoice_id: &str,
        payment_method_id: &str,
        idempotency_key: &str,
    ) -> Result<InvoiceEntity>;

    async fn fetch_open_invoices(
        &self,
        customer_id: &str,
        created_before_secs: i64,
    ) -> Result<Vec<InvoiceEntity>>;
}
