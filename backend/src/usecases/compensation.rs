use crates::domain::{
    entities::customers::CustomerEntity, value_objects::diagnostics::DiagnosticReport,
};
use tracing::{error, info};

use super::{
    errors::{SubscriptionError, UseCaseResult},
    services::BillingServices,
};

/// What a failed checkout left behind and must be undone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rollback<'a> {
    pub subscription_id: Option<&'a str>,
    pub agreement_id: Option<&'a str>,
    /// Customer whose agreement reference is cleared again.
    pub detach_agreement_from: Option<&'a CustomerEntity>,
}

fn report_failure(
    services: &BillingServices,
    context: &'static str,
    step: &str,
    target: &str,
    err: &anyhow::Error,
) {
    error!(context, step, target, error = ?err, "compensation: rollback step failed");
    services.reporter.report(
        DiagnosticReport::new(context, format!("rollback step `{step}` failed: {err}"))
            .with_field("step", step)
            .with_field("target", target),
    );
}

/// Runs every rollback step concurrently and waits for all of them.
///
/// Each failed step is logged and reported. The first failure is returned and
/// replaces the caller's original error.
pub async fn roll_back(
    services: &BillingServices,
    rollback: Rollback<'_>,
    context: &'static str,
) -> UseCaseResult<()> {
    let cancel_subscription = async {
        match rollback.subscription_id {
            Some(id) => Some((id, services.subscriptions.cancel_subscription(id).await)),
            None => None,
        }
    };
    let cancel_agreement = async {
        match rollback.agreement_id {
            Some(id) => Some((id, services.agreements.cancel_billing_agreement(id).await)),
            None => None,
        }
    };
    let detach_agreement = async {
        match rollback.detach_agreement_from {
            Some(customer) => Some((
                customer.id.as_str(),
                services
                    .customers
                    .update_customer_paypal_agreement(customer, "")
                    .await
                    .map(|_| ()),
            )),
            None => None,
        }
    };

    let (subscription, agreement, detach) =
        tokio::join!(cancel_subscription, cancel_agreement, detach_agreement);

    let mut first_failure = None;
    for (step, outcome) in [
        ("cancel_subscription", subscription),
        ("cancel_billing_agreement", agreement),
        ("detach_billing_agreement", detach),
    ] {
        match outcome {
            Some((target, Ok(()))) => info!(context, step, target, "compensation: rolled back"),
            Some((target, Err(err))) => {
                report_failure(services, context, step, target, &err);
                first_failure.get_or_insert(err);
            }
            None => {}
        }
    }

    match first_failure {
        Some(err) => Err(SubscriptionError::Upstream(err)),
        None => Ok(()),
    }
}
