use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::{customers::CustomerEntity, invoices::InvoiceEntity};

/// Settles invoices of billing-agreement subscriptions.
#[automock]
#[async_trait]
pub trait InvoiceProcessor: Send + Sync {
    async fn process_invoice(
        &self,
        customer: &CustomerEntity,
        invoice: &InvoiceEntity,
        ip_address: Option<String>,
    ) -> Result<()>;

    /// Marks an invoice below the chargeable minimum as paid without charging.
    async fn process_zero_invoice(&self, invoice: &InvoiceEntity) -> Result<()>;
}
