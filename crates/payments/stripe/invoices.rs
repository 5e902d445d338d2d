use anyhow::Result;

use super::{
    client::{StripeClient, field},
    types::{METADATA_PAYMENT_ATTEMPTS, METADATA_PAYPAL_TRANSACTION, StripeInvoice},
};
use crate::domain::entities::invoices::InvoiceEntity;

impl StripeClient {
    pub async fn finalize_invoice(&self, invoice_id: &str) -> Result<InvoiceEntity> {
        let body = vec![field("auto_advance", false)];
        let invoice: StripeInvoice = self
            .post(
                &format!("/v1/invoices/{invoice_id}/finalize"),
                &body,
                None,
                "finalize invoice",
            )
            .await?;
        Ok(invoice.into())
    }

    /// Marks an invoice paid for money collected outside Stripe.
    pub async fn pay_invoice_out_of_band(&self, invoice_id: &str) -> Result<InvoiceEntity> {
        let body = vec![field("paid_out_of_band", true)];
        let invoice: StripeInvoice = self
            .post(
                &format!("/v1/invoices/{invoice_id}/pay"),
                &body,
                None,
                "pay invoice out of band",
            )
            .await?;
        Ok(invoice.into())
    }

    pub async fn record_invoice_payment(
        &self,
        invoice_id: &str,
        attempts: i64,
        transaction_id: Option<&str>,
    ) -> Result<()> {
        let mut body = vec![field(
            &format!("metadata[{METADATA_PAYMENT_ATTEMPTS}]"),
            attempts,
        )];
        if let Some(transaction_id) = transaction_id {
            body.push(field(
                &format!("metadata[{METADATA_PAYPAL_TRANSACTION}]"),
                transaction_id,
            ));
        }

        let _: StripeInvoice = self
            .post(
                &format!("/v1/invoices/{invoice_id}"),
                &body,
                None,
                "update invoice metadata",
            )
            .await?;
        Ok(())
    }
}
