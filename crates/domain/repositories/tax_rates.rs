use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::tax_rates::TaxRateEntity;

#[automock]
#[async_trait]
pub trait TaxRateLookup: Send + Sync {
    async fn tax_rate_by_country_code(&self, country: &str) -> Result<Option<TaxRateEntity>>;
}
