use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::iam::{AuthenticatedUser, Credentials};

#[automock]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` for missing, invalid or unknown credentials.
    async fn resolve(&self, credentials: &Credentials) -> Result<Option<AuthenticatedUser>>;
}
