use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::{info, warn};

use super::client::{PaypalClient, ReferenceTransaction, ReferenceTransactionResult};
use crate::{
    domain::{
        entities::{customers::CustomerEntity, invoices::InvoiceEntity},
        interfaces::invoice_processing::InvoiceProcessor,
        value_objects::enums::invoice_statuses::InvoiceStatus,
    },
    payments::stripe::StripeClient,
};

#[derive(Debug, Error, PartialEq)]
pub enum PaypalChargeError {
    #[error("customer {0} has no billing agreement")]
    MissingAgreement(String),
    #[error("invoice {invoice_id} charge ended with status {status}")]
    Declined { invoice_id: String, status: String },
}

/// The invoice bookkeeping side of a billing-agreement charge.
#[automock]
#[async_trait]
pub trait InvoiceLedger: Send + Sync {
    async fn finalize(&self, invoice_id: &str) -> Result<()>;
    async fn mark_paid_out_of_band(&self, invoice_id: &str) -> Result<()>;
    async fn record_attempt(
        &self,
        invoice_id: &str,
        attempts: i64,
        transaction_id: Option<String>,
    ) -> Result<()>;
}

#[automock]
#[async_trait]
pub trait ReferenceCharger: Send + Sync {
    async fn charge(&self, transaction: &ReferenceTransaction)
    -> Result<ReferenceTransactionResult>;
}

#[async_trait]
impl InvoiceLedger for StripeClient {
    async fn finalize(&self, invoice_id: &str) -> Result<()> {
        self.finalize_invoice(invoice_id).await?;
        Ok(())
    }

    async fn mark_paid_out_of_band(&self, invoice_id: &str) -> Result<()> {
        self.pay_invoice_out_of_band(invoice_id).await?;
        Ok(())
    }

    async fn record_attempt(
        &self,
        invoice_id: &str,
        attempts: i64,
        transaction_id: Option<String>,
    ) -> Result<()> {
        self.record_invoice_payment(invoice_id, attempts, transaction_id.as_deref())
            .await
    }
}

#[async_trait]
impl ReferenceCharger for PaypalClient {
    async fn charge(
        &self,
        transaction: &ReferenceTransaction,
    ) -> Result<ReferenceTransactionResult> {
        self.do_reference_transaction(transaction).await
    }
}

pub struct PaypalInvoiceProcessor {
    ledger: Arc<dyn InvoiceLedger>,
    charger: Arc<dyn ReferenceCharger>,
}

impl PaypalInvoiceProcessor {
    pub fn new(ledger: Arc<dyn InvoiceLedger>, charger: Arc<dyn ReferenceCharger>) -> Self {
        Self { ledger, charger }
    }

    async fn ensure_finalized(&self, invoice: &InvoiceEntity) -> Result<()> {
        if invoice.status == InvoiceStatus::Draft {
            self.ledger.finalize(&invoice.id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl InvoiceProcessor for PaypalInvoiceProcessor {
    async fn process_invoice(
        &self,
        customer: &CustomerEntity,
        invoice: &InvoiceEntity,
        ip_address: Option<String>,
    ) -> Result<()> {
        if invoice.status == InvoiceStatus::Paid {
            info!(invoice_id = %invoice.id, "paypal: invoice already paid");
            return Ok(());
        }

        let agreement_id = customer
            .paypal_agreement()
            .ok_or_else(|| PaypalChargeError::MissingAgreement(customer.id.clone()))?;

        self.ensure_finalized(invoice).await?;

        let transaction = ReferenceTransaction {
            agreement_id: agreement_id.to_string(),
            amount_minor: invoice.amount_due,
            currency: invoice.currency.clone(),
            invoice_number: invoice.id.clone(),
            idempotency_key: invoice.payment_attempt_key(),
            ip_address,
        };

        let attempts = invoice.attempt_count + 1;
        let result = match self.charger.charge(&transaction).await {
            Ok(result) => result,
            Err(err) => {
                // The next attempt needs a fresh message id.
                if let Err(record_err) = self.ledger.record_attempt(&invoice.id, attempts, None).await
                {
                    warn!(invoice_id = %invoice.id, error = ?record_err, "paypal: failed to record payment attempt");
                }
                return Err(err);
            }
        };

        self.ledger
            .record_attempt(&invoice.id, attempts, Some(result.transaction_id.clone()))
            .await?;

        match result.payment_status.as_str() {
            "Completed" | "Processed" => {
                self.ledger.mark_paid_out_of_band(&invoice.id).await?;
                info!(invoice_id = %invoice.id, transaction_id = %result.transaction_id, "paypal: invoice paid");
                Ok(())
            }
            "Pending" | "In-Progress" => {
                info!(
                    invoice_id = %invoice.id,
                    pending_reason = ?result.pending_reason,
                    "paypal: payment pending, invoice left open"
                );
                Ok(())
            }
            status => Err(PaypalChargeError::Declined {
                invoice_id: invoice.id.clone(),
                status: status.to_string(),
            }
            .into()),
        }
    }

    async fn process_zero_invoice(&self, invoice: &InvoiceEntity) -> Result<()> {
        self.ensure_finalized(invoice).await?;
        self.ledger.mark_paid_out_of_band(&invoice.id).await?;
        info!(invoice_id = %invoice.id, "paypal: zero invoice settled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn customer() -> CustomerEntity {
        CustomerEntity {
            id: "cus_1".to_string(),
            paypal_agreement_id: Some("B-1".to_string()),
            ..Default::default()
        }
    }

    fn invoice(status: InvoiceStatus) -> InvoiceEntity {
        InvoiceEntity {
            id: "in_1".to_string(),
            customer_id: "cus_1".to_string(),
            amount_due: 999,
            currency: "usd".to_string(),
            status,
            attempt_count: 1,
            ..Default::default()
        }
    }

    fn result(status: &str) -> ReferenceTransactionResult {
        ReferenceTransactionResult {
            transaction_id: "TX1".to_string(),
            payment_status: status.to_string(),
            pending_reason: None,
        }
    }

    #[tokio::test]
    async fn completed_charge_marks_invoice_paid() {
        let mut ledger = MockInvoiceLedger::new();
        ledger
            .expect_finalize()
            .with(eq("in_1"))
            .times(1)
            .returning(|_| Ok(()));
        ledger
            .expect_record_attempt()
            .with(eq("in_1"), eq(2), eq(Some("TX1".to_string())))
            .times(1)
            .returning(|_, _, _| Ok(()));
        ledger
            .expect_mark_paid_out_of_band()
            .with(eq("in_1"))
            .times(1)
            .returning(|_| Ok(()));

        let mut charger = MockReferenceCharger::new();
        charger
            .expect_charge()
            .withf(|transaction| {
                transaction.agreement_id == "B-1"
                    && transaction.idempotency_key == "in_1-1"
                    && transaction.ip_address.as_deref() == Some("1.2.3.4")
            })
            .times(1)
            .returning(|_| Ok(result("Completed")));

        let processor = PaypalInvoiceProcessor::new(Arc::new(ledger), Arc::new(charger));

        processor
            .process_invoice(
                &customer(),
                &invoice(InvoiceStatus::Draft),
                Some("1.2.3.4".to_string()),
            )
            .await
            .expect("charge succeeds");
    }

    #[tokio::test]
    async fn declined_charge_is_an_error() {
        let mut ledger = MockInvoiceLedger::new();
        ledger.expect_finalize().never();
        ledger
            .expect_record_attempt()
            .returning(|_, _, _| Ok(()));
        ledger.expect_mark_paid_out_of_band().never();

        let mut charger = MockReferenceCharger::new();
        charger
            .expect_charge()
            .returning(|_| Ok(result("Denied")));

        let processor = PaypalInvoiceProcessor::new(Arc::new(ledger), Arc::new(charger));

        let err = processor
            .process_invoice(&customer(), &invoice(InvoiceStatus::Open), None)
            .await
            .expect_err("declined");

        assert_eq!(
            err.downcast_ref::<PaypalChargeError>(),
            Some(&PaypalChargeError::Declined {
                invoice_id: "in_1".to_string(),
                status: "Denied".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn missing_agreement_never_charges() {
        let ledger = MockInvoiceLedger::new();
        let mut charger = MockReferenceCharger::new();
        charger.expect_charge().never();

        let processor = PaypalInvoiceProcessor::new(Arc::new(ledger), Arc::new(charger));
        let customer = CustomerEntity {
            id: "cus_2".to_string(),
            ..Default::default()
        };

        let err = processor
            .process_invoice(&customer, &invoice(InvoiceStatus::Open), None)
            .await
            .expect_err("no agreement");

        assert_eq!(
            err.downcast_ref::<PaypalChargeError>(),
            Some(&PaypalChargeError::MissingAgreement("cus_2".to_string()))
        );
    }

    #[tokio::test]
    async fn zero_invoice_is_paid_without_charging() {
        let mut ledger = MockInvoiceLedger::new();
        ledger.expect_finalize().times(1).returning(|_| Ok(()));
        ledger
            .expect_mark_paid_out_of_band()
            .with(eq("in_1"))
            .times(1)
            .returning(|_| Ok(()));
        let mut charger = MockReferenceCharger::new();
        charger.expect_charge().never();

        let processor = PaypalInvoiceProcessor::new(Arc::new(ledger), Arc::new(charger));

        processor
            .process_zero_invoice(&invoice(InvoiceStatus::Draft))
            .await
            .expect("zero invoice settles");
    }
}
