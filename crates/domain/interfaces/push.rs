use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[automock]
#[async_trait]
pub trait DevicePush: Send + Sync {
    async fn notify_profile_updated(&self, uid: &str) -> Result<()>;
}
