use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::{plans::AbbrevPlan, promotion_codes::PromotionCodeEntity};

#[automock]
#[async_trait]
pub trait PlanLookup: Send + Sync {
    async fn find_abbrev_plan_by_id(&self, price_id: &str) -> Result<Option<AbbrevPlan>>;
    async fn all_abbrev_plans(&self) -> Result<Vec<AbbrevPlan>>;
    async fn find_promotion_code(&self, code: &str) -> Result<Option<PromotionCodeEntity>>;
}
