use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::external_entitlements::ExternalEntitlementEntity;

#[automock]
#[async_trait]
pub trait ExternalEntitlementRepository: Send + Sync {
    async fn list_for_uid(&self, uid: &str) -> Result<Vec<ExternalEntitlementEntity>>;
}
