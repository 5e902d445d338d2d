use chrono::Utc;
use crates::domain::{
    entities::{customers::CustomerEntity, plans::AbbrevPlan},
    value_objects::enums::eligibility_results::EligibilityResult,
};
use tracing::{error, info};

use super::{
    errors::{SubscriptionError, UseCaseResult},
    services::BillingServices,
};

/// A product the user already has access to, whichever rail sold it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeldProduct {
    pub product_id: String,
    pub product_set: Option<String>,
}

pub fn decide(held: &[HeldProduct], target: &AbbrevPlan) -> EligibilityResult {
    if held.iter().any(|product| product.product_id == target.product_id) {
        return EligibilityResult::BlockedExistingEquivalent;
    }
    if held
        .iter()
        .any(|product| target.shares_product_set_with(product.product_set.as_deref()))
    {
        return EligibilityResult::BlockedConflicting;
    }
    EligibilityResult::Create
}

async fn held_products(
    services: &BillingServices,
    uid: &str,
    customer: &CustomerEntity,
) -> UseCaseResult<Vec<HeldProduct>> {
    let mut held = Vec::new();

    let active_items: Vec<_> = customer
        .active_subscriptions()
        .flat_map(|subscription| subscription.items.iter())
        .collect();
    if !active_items.is_empty() {
        let plans = services.plans.all_abbrev_plans().await.map_err(|err| {
            error!(%uid, error = ?err, "eligibility: failed to list plans");
            SubscriptionError::Upstream(err)
        })?;
        for item in active_items {
            let product_set = plans
                .iter()
                .find(|plan| plan.plan_id == item.price_id)
                .and_then(|plan| plan.product_set.clone());
            held.push(HeldProduct {
                product_id: item.product_id.clone(),
                product_set,
            });
        }
    }

    let now = Utc::now();
    let entitlements = services.entitlements.list_for_uid(uid).await.map_err(|err| {
        error!(%uid, db_error = ?err, "eligibility: failed to load external entitlements");
        SubscriptionError::Upstream(err)
    })?;
    held.extend(
        entitlements
            .into_iter()
            .filter(|entitlement| entitlement.is_active(now))
            .map(|entitlement| HeldProduct {
                product_id: entitlement.product_id,
                product_set: entitlement.product_set,
            }),
    );

    Ok(held)
}

pub async fn check_eligibility(
    services: &BillingServices,
    uid: &str,
    customer: &CustomerEntity,
    target: &AbbrevPlan,
) -> UseCaseResult<EligibilityResult> {
    let held = held_products(services, uid, customer).await?;
    Ok(decide(&held, target))
}

/// Fails with `UserAlreadySubscribed` unless a new subscription may be created.
pub async fn ensure_eligible(
    services: &BillingServices,
    uid: &str,
    customer: &CustomerEntity,
    target: &AbbrevPlan,
) -> UseCaseResult<()> {
    let result = check_eligibility(services, uid, customer, target).await?;
    if result == EligibilityResult::Create {
        return Ok(());
    }

    info!(
        %uid,
        product_id = %target.product_id,
        %result,
        "eligibility: user already holds the product"
    );
    Err(SubscriptionError::UserAlreadySubscribed {
        product_id: target.product_id.clone(),
        result,
    })
}
