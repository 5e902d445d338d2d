use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::enums::billing_agreement_statuses::BillingAgreementStatus;

#[automock]
#[async_trait]
pub trait BillingAgreementRecordRepository: Send + Sync {
    /// Fails on a duplicate `(uid, agreement)` row.
    async fn create_paypal_ba(
        &self,
        uid: &str,
        agreement_id: &str,
        status: BillingAgreementStatus,
    ) -> Result<()>;
}
