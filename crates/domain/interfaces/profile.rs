use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[automock]
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn delete_cache(&self, uid: &str) -> Result<()>;
}
