use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::account_customers::AccountCustomerEntity;

#[automock]
#[async_trait]
pub trait AccountCustomerRepository: Send + Sync {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AccountCustomerEntity>>;
    async fn upsert_stripe_customer_id(&self, uid: &str, stripe_customer_id: &str) -> Result<()>;
}
