use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::{
    client::{StripeClient, expand_params, field},
    types::{StripeList, StripePaymentMethod, StripePrice, StripePromotionCode, StripeTaxRate},
};
use crate::domain::{
    entities::{
        payment_methods::PaymentMethodEntity, plans::AbbrevPlan,
        promotion_codes::PromotionCodeEntity, tax_rates::TaxRateEntity,
    },
    repositories::{
        payment_methods::PaymentMethodLookup, plans::PlanLookup, tax_rates::TaxRateLookup,
    },
};

const PAGE_LIMIT: u32 = 100;

impl StripeClient {
    async fn list_active_prices(&self) -> Result<Vec<StripePrice>> {
        let mut prices = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut query = vec![field("active", true), field("limit", PAGE_LIMIT)];
            query.extend(expand_params(["data.product"]));
            if let Some(cursor) = &starting_after {
                query.push(field("starting_after", cursor));
            }

            let page: StripeList<StripePrice> =
                self.get("/v1/prices", &query, "list prices").await?;
            starting_after = page.data.last().map(|price| price.id.clone());
            let has_more = page.has_more;
            prices.extend(page.data);

            if !has_more || starting_after.is_none() {
                break;
            }
        }

        Ok(prices)
    }
}

#[async_trait]
impl PlanLookup for StripeClient {
    async fn find_abbrev_plan_by_id(&self, price_id: &str) -> Result<Option<AbbrevPlan>> {
        let plan = self
            .all_abbrev_plans()
            .await?
            .into_iter()
            .find(|plan| plan.plan_id == price_id);

        if plan.is_none() {
            debug!(%price_id, "stripe: price not found among active prices");
        }
        Ok(plan)
    }

    async fn all_abbrev_plans(&self) -> Result<Vec<AbbrevPlan>> {
        let prices = self.list_active_prices().await?;
        Ok(prices
            .into_iter()
            .filter(|price| price.recurring.is_some())
            .map(AbbrevPlan::from)
            .collect())
    }

    async fn find_promotion_code(&self, code: &str) -> Result<Option<PromotionCodeEntity>> {
        let mut query = vec![field("code", code), field("limit", 1)];
        query.extend(expand_params(["data.coupon.applies_to"]));

        let page: StripeList<StripePromotionCode> = self
            .get("/v1/promotion_codes", &query, "list promotion codes")
            .await?;

        Ok(page.data.into_iter().next().map(PromotionCodeEntity::from))
    }
}

#[async_trait]
impl TaxRateLookup for StripeClient {
    async fn tax_rate_by_country_code(&self, country: &str) -> Result<Option<TaxRateEntity>> {
        let query = vec![field("active", true), field("limit", PAGE_LIMIT)];
        let page: StripeList<StripeTaxRate> =
            self.get("/v1/tax_rates", &query, "list tax rates").await?;

        Ok(page
            .data
            .into_iter()
            .filter_map(StripeTaxRate::into_entity)
            .find(|rate| rate.country.eq_ignore_ascii_case(country)))
    }
}

#[async_trait]
impl PaymentMethodLookup for StripeClient {
    async fn get_payment_method(&self, payment_method_id: &str) -> Result<PaymentMethodEntity> {
        let method: StripePaymentMethod = self
            .get(
                &format!("/v1/payment_methods/{payment_method_id}"),
                &Vec::new(),
                "retrieve payment method",
            )
            .await?;
        Ok(method.into())
    }

    async fn detach_payment_method(&self, payment_method_id: &str) -> Result<PaymentMethodEntity> {
        let method: StripePaymentMethod = self
            .post(
                &format!("/v1/payment_methods/{payment_method_id}/detach"),
                &Vec::new(),
                None,
                "detach payment method",
            )
            .await?;
        Ok(method.into())
    }
}
