use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::accounts::{AccountEntity, EmailEntity};

#[automock]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AccountEntity>>;
    async fn find_email_record(&self, email: &str) -> Result<Option<EmailEntity>>;
    /// Removes the account together with all of its email rows.
    async fn delete_account(&self, uid: &str) -> Result<()>;
    async fn delete_email(&self, uid: &str, email: &str) -> Result<()>;
}
