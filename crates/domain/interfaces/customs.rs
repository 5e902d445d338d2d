use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::customs::CustomsVerdict;

#[automock]
#[async_trait]
pub trait CustomsGate: Send + Sync {
    async fn check(&self, client_address: &str, email: &str, action: &str)
    -> Result<CustomsVerdict>;
}
