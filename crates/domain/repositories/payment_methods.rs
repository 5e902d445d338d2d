use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::payment_methods::PaymentMethodEntity;

#[automock]
#[async_trait]
pub trait PaymentMethodLookup: Send + Sync {
    async fn get_payment_method(&self, payment_method_id: &str) -> Result<PaymentMethodEntity>;
    async fn detach_payment_method(&self, payment_method_id: &str) -> Result<PaymentMethodEntity>;
}
