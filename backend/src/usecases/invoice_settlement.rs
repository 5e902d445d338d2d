use std::sync::Arc;

use crates::domain::{
    entities::{
        customers::CustomerEntity, invoices::InvoiceEntity, subscriptions::SubscriptionEntity,
    },
    interfaces::{diagnostics::ErrorReporter, invoice_processing::InvoiceProcessor},
    value_objects::{diagnostics::DiagnosticReport, invoices::needs_active_charge},
};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{
    compensation::{Rollback, roll_back},
    errors::{SubscriptionError, UseCaseResult},
    services::BillingServices,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Below the currency minimum; marked paid without a charge.
    Zero,
    Charge,
}

pub fn settlement_for(invoice: &InvoiceEntity) -> UseCaseResult<Settlement> {
    match needs_active_charge(invoice) {
        Ok(true) => Ok(Settlement::Charge),
        Ok(false) => Ok(Settlement::Zero),
        Err(err) => Err(SubscriptionError::internal_validation(
            "settle_invoice",
            err.to_string(),
        )),
    }
}

/// Settles one invoice with no rollback on failure.
pub async fn settle_invoice(
    processor: &dyn InvoiceProcessor,
    customer: &CustomerEntity,
    invoice: &InvoiceEntity,
    ip_address: Option<String>,
) -> UseCaseResult<()> {
    match settlement_for(invoice)? {
        Settlement::Zero => processor.process_zero_invoice(invoice).await?,
        Settlement::Charge => processor.process_invoice(customer, invoice, ip_address).await?,
    }
    info!(invoice_id = %invoice.id, "settlement: invoice settled");
    Ok(())
}

/// Settles the first invoice of a subscription created in this request.
///
/// Any failure cancels the subscription, and `created_agreement` when given,
/// before the error is returned.
pub async fn settle_initial_invoice(
    services: &BillingServices,
    customer: &CustomerEntity,
    subscription: &SubscriptionEntity,
    created_agreement: Option<&str>,
    ip_address: Option<String>,
) -> UseCaseResult<()> {
    if let Err(err) = charge_initial_invoice(services, customer, subscription, ip_address).await {
        error!(
            subscription_id = %subscription.id,
            error = %err,
            "settlement: initial invoice not settled, cancelling"
        );
        roll_back(
            services,
            Rollback {
                subscription_id: Some(&subscription.id),
                agreement_id: created_agreement,
                detach_agreement_from: None,
            },
            "settle_initial_invoice",
        )
        .await?;
        return Err(err);
    }

    info!(subscription_id = %subscription.id, "settlement: initial invoice settled");
    Ok(())
}

async fn charge_initial_invoice(
    services: &BillingServices,
    customer: &CustomerEntity,
    subscription: &SubscriptionEntity,
    ip_address: Option<String>,
) -> UseCaseResult<()> {
    let invoice = subscription.latest_invoice.as_ref().ok_or_else(|| {
        SubscriptionError::internal_validation(
            "settle_initial_invoice",
            format!("subscription {} has no latest invoice", subscription.id),
        )
    })?;

    let processor = services.invoice_processor.as_ref();
    let outcome = match settlement_for(invoice)? {
        Settlement::Zero => processor.process_zero_invoice(invoice).await,
        Settlement::Charge => processor.process_invoice(customer, invoice, ip_address).await,
    };
    outcome.map_err(|err| {
        error!(invoice_id = %invoice.id, error = ?err, "settlement: initial invoice failed");
        SubscriptionError::Upstream(err)
    })
}

/// Settles invoices off the request path; failures only reach the reporter.
#[derive(Clone)]
pub struct BackgroundSettlement {
    processor: Arc<dyn InvoiceProcessor>,
    reporter: Arc<dyn ErrorReporter>,
}

impl BackgroundSettlement {
    pub fn new(processor: Arc<dyn InvoiceProcessor>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            processor,
            reporter,
        }
    }

    pub fn submit(
        &self,
        customer: CustomerEntity,
        invoice: InvoiceEntity,
        ip_address: Option<String>,
    ) -> JoinHandle<()> {
        let processor = Arc::clone(&self.processor);
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move {
            let outcome = settle_invoice(processor.as_ref(), &customer, &invoice, ip_address).await;
            if let Err(err) = outcome {
                error!(
                    customer_id = %customer.id,
                    invoice_id = %invoice.id,
                    error = ?err,
                    "settlement: background settlement failed"
                );
                reporter.report(
                    DiagnosticReport::new("background_settlement", err.to_string())
                        .with_field("customer_id", customer.id.clone())
                        .with_field("invoice_id", invoice.id.clone()),
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use crates::domain::{
        interfaces::{diagnostics::MockErrorReporter, invoice_processing::MockInvoiceProcessor},
        value_objects::enums::{
            collection_methods::CollectionMethod, subscription_statuses::SubscriptionStatus,
        },
    };
    use mockall::predicate::eq;

    use super::*;
    use crate::usecases::test_support::{Mocks, customer, invoice, subscription};

    #[test]
    fn minimum_amount_is_charged() {
        assert_eq!(settlement_for(&invoice("in_1", 50, "usd")).unwrap(), Settlement::Charge);
        assert_eq!(settlement_for(&invoice("in_2", 49, "usd")).unwrap(), Settlement::Zero);
        assert_eq!(settlement_for(&invoice("in_3", 29, "gbp")).unwrap(), Settlement::Zero);
        assert!(matches!(
            settlement_for(&invoice("in_4", 5000, "xyz")),
            Err(SubscriptionError::InternalValidation { .. })
        ));
    }

    fn paypal_subscription(amount_due: i64) -> SubscriptionEntity {
        let mut created = subscription(
            "sub_1",
            "price_1",
            SubscriptionStatus::Incomplete,
            CollectionMethod::SendInvoice,
        );
        created.latest_invoice = Some(invoice("in_1", amount_due, "usd"));
        created
    }

    #[tokio::test]
    async fn failed_charge_cancels_subscription_and_new_agreement() {
        let mut mocks = Mocks::new();
        mocks
            .invoice_processor
            .expect_process_invoice()
            .withf(|_, invoice, _| invoice.id == "in_1")
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("reference transaction declined")));
        mocks.invoice_processor.expect_process_zero_invoice().never();
        mocks
            .subscriptions
            .expect_cancel_subscription()
            .with(eq("sub_1"))
            .times(1)
            .returning(|_| Ok(()));
        mocks
            .agreements
            .expect_cancel_billing_agreement()
            .with(eq("B-1"))
            .times(1)
            .returning(|_| Ok(()));
        let services = mocks.into_services();

        let err = settle_initial_invoice(
            &services,
            &customer("cus_1"),
            &paypal_subscription(50),
            Some("B-1"),
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "reference transaction declined");
    }

    #[tokio::test]
    async fn failed_charge_keeps_the_agreement_on_file() {
        let mut mocks = Mocks::new();
        mocks
            .invoice_processor
            .expect_process_invoice()
            .withf(|customer, _, _| customer.id == "C2")
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("reference transaction declined")));
        mocks
            .subscriptions
            .expect_cancel_subscription()
            .with(eq("sub_1"))
            .times(1)
            .returning(|_| Ok(()));
        mocks.agreements.expect_cancel_billing_agreement().never();
        let services = mocks.into_services();

        let err = settle_initial_invoice(
            &services,
            &customer("C2"),
            &paypal_subscription(50),
            None,
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "reference transaction declined");
    }

    #[tokio::test]
    async fn failed_zero_invoice_cancels_what_was_created() {
        let mut mocks = Mocks::new();
        mocks.invoice_processor.expect_process_invoice().never();
        mocks
            .invoice_processor
            .expect_process_zero_invoice()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("stripe down")));
        mocks
            .subscriptions
            .expect_cancel_subscription()
            .with(eq("sub_1"))
            .times(1)
            .returning(|_| Ok(()));
        mocks
            .agreements
            .expect_cancel_billing_agreement()
            .with(eq("B-1"))
            .times(1)
            .returning(|_| Ok(()));
        let services = mocks.into_services();

        let err = settle_initial_invoice(
            &services,
            &customer("cus_1"),
            &paypal_subscription(0),
            Some("B-1"),
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "stripe down");
    }

    #[tokio::test]
    async fn unknown_currency_cancels_without_settling() {
        let mut mocks = Mocks::new();
        mocks.invoice_processor.expect_process_invoice().never();
        mocks.invoice_processor.expect_process_zero_invoice().never();
        mocks
            .subscriptions
            .expect_cancel_subscription()
            .with(eq("sub_1"))
            .times(1)
            .returning(|_| Ok(()));
        mocks
            .agreements
            .expect_cancel_billing_agreement()
            .with(eq("B-1"))
            .times(1)
            .returning(|_| Ok(()));
        let services = mocks.into_services();
        let mut created = paypal_subscription(5000);
        created.latest_invoice = Some(invoice("in_1", 5000, "xyz"));

        let err = settle_initial_invoice(&services, &customer("cus_1"), &created, Some("B-1"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InternalValidation { .. }));
    }

    #[tokio::test]
    async fn missing_latest_invoice_cancels_the_subscription() {
        let mut mocks = Mocks::new();
        mocks
            .subscriptions
            .expect_cancel_subscription()
            .with(eq("sub_1"))
            .times(1)
            .returning(|_| Ok(()));
        mocks.agreements.expect_cancel_billing_agreement().never();
        let services = mocks.into_services();
        let mut created = paypal_subscription(50);
        created.latest_invoice = None;

        let err = settle_initial_invoice(&services, &customer("cus_1"), &created, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InternalValidation { .. }));
    }

    #[tokio::test]
    async fn failed_cancellation_replaces_the_charge_error() {
        let mut mocks = Mocks::new();
        mocks
            .invoice_processor
            .expect_process_invoice()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("Declined")));
        mocks
            .subscriptions
            .expect_cancel_subscription()
            .with(eq("sub_1"))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("cancel failed: stripe 500")));
        mocks
            .agreements
            .expect_cancel_billing_agreement()
            .with(eq("B-1"))
            .times(1)
            .returning(|_| Ok(()));
        mocks.reporter.expect_report().times(1).return_const(());
        let services = mocks.into_services();

        let err = settle_initial_invoice(
            &services,
            &customer("cus_1"),
            &paypal_subscription(50),
            Some("B-1"),
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "cancel failed: stripe 500");
    }

    #[tokio::test]
    async fn small_invoice_is_settled_as_zero() {
        let mut mocks = Mocks::new();
        mocks.invoice_processor.expect_process_invoice().never();
        mocks
            .invoice_processor
            .expect_process_zero_invoice()
            .times(1)
            .returning(|_| Ok(()));
        mocks.subscriptions.expect_cancel_subscription().never();
        let services = mocks.into_services();

        settle_initial_invoice(&services, &customer("cus_1"), &paypal_subscription(49), None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn background_failures_go_to_the_reporter() {
        let mut processor = MockInvoiceProcessor::new();
        processor
            .expect_process_invoice()
            .returning(|_, invoice, _| match invoice.id.as_str() {
                "in_bad" => Err(anyhow::anyhow!("agreement revoked")),
                _ => Ok(()),
            });
        let mut reporter = MockErrorReporter::new();
        reporter
            .expect_report()
            .withf(|report| report.fields.get("invoice_id").map(String::as_str) == Some("in_bad"))
            .times(1)
            .return_const(());
        let settlement = BackgroundSettlement::new(Arc::new(processor), Arc::new(reporter));

        let good = settlement.submit(customer("cus_1"), invoice("in_good", 999, "usd"), None);
        let bad = settlement.submit(customer("cus_1"), invoice("in_bad", 999, "usd"), None);

        good.await.unwrap();
        bad.await.unwrap();
    }
}
