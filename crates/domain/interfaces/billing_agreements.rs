use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::billing_agreements::AgreementDetails;

#[automock]
#[async_trait]
pub trait BillingAgreementGateway: Send + Sync {
    async fn get_checkout_token(&self, currency_code: &str) -> Result<String>;
    /// Exchanges an approved checkout token for an agreement id.
    async fn create_billing_agreement(&self, token: &str) -> Result<String>;
    async fn agreement_details(&self, agreement_id: &str) -> Result<AgreementDetails>;
    async fn cancel_billing_agreement(&self, agreement_id: &str) -> Result<()>;
}
