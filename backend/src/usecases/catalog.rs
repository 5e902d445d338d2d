use chrono::Utc;
use crates::domain::entities::{plans::AbbrevPlan, promotion_codes::PromotionCodeEntity};
use tracing::{error, info};

use super::{
    errors::{SubscriptionError, UseCaseResult},
    services::BillingServices,
};

pub async fn require_plan(services: &BillingServices, price_id: &str) -> UseCaseResult<AbbrevPlan> {
    services
        .plans
        .find_abbrev_plan_by_id(price_id)
        .await
        .map_err(|err| {
            error!(%price_id, error = ?err, "plans: lookup failed");
            SubscriptionError::Upstream(err)
        })?
        .ok_or_else(|| SubscriptionError::UnknownSubscriptionPlan {
            plan_id: price_id.to_string(),
        })
}

/// Resolves a customer-entered code; an unusable code fails the whole checkout.
pub async fn extract_promotion_code(
    services: &BillingServices,
    code: Option<&str>,
    plan: &AbbrevPlan,
) -> UseCaseResult<Option<PromotionCodeEntity>> {
    let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) else {
        return Ok(None);
    };

    let promotion = services
        .plans
        .find_promotion_code(code)
        .await
        .map_err(|err| {
            error!(%code, error = ?err, "promotions: lookup failed");
            SubscriptionError::Upstream(err)
        })?;

    match promotion {
        Some(promotion) if promotion.is_valid_for(plan, Utc::now().timestamp()) => {
            Ok(Some(promotion))
        }
        _ => {
            info!(%code, plan_id = %plan.plan_id, "promotions: code rejected");
            Err(SubscriptionError::InvalidPromotionCode {
                code: code.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::usecases::test_support::{Mocks, plan};

    #[tokio::test]
    async fn code_for_another_product_is_rejected() {
        let mut mocks = Mocks::new();
        mocks
            .plans
            .expect_find_promotion_code()
            .with(eq("SPRING"))
            .returning(|code| {
                Ok(Some(PromotionCodeEntity {
                    id: "promo_1".into(),
                    code: code.to_string(),
                    active: true,
                    coupon_valid: true,
                    expires_at: None,
                    applies_to_products: vec!["prod_other".into()],
                }))
            });
        let services = mocks.into_services();

        let vpn = plan("price_1", "prod_vpn", "usd");

        let err = extract_promotion_code(&services, Some(" SPRING "), &vpn)
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidPromotionCode { code } if code == "SPRING"));
    }

    #[tokio::test]
    async fn blank_code_is_ignored() {
        let mut mocks = Mocks::new();
        mocks.plans.expect_find_promotion_code().never();
        let services = mocks.into_services();

        let vpn = plan("price_1", "prod_vpn", "usd");

        let promotion = extract_promotion_code(&services, Some(""), &vpn).await.unwrap();

        assert!(promotion.is_none());
    }

    #[tokio::test]
    async fn unknown_price_is_an_unknown_plan() {
        let mut mocks = Mocks::new();
        mocks
            .plans
            .expect_find_abbrev_plan_by_id()
            .with(eq("price_gone"))
            .returning(|_| Ok(None));
        let services = mocks.into_services();

        let err = require_plan(&services, "price_gone").await.unwrap_err();

        assert!(matches!(err, SubscriptionError::UnknownSubscriptionPlan { .. }));
    }
}
