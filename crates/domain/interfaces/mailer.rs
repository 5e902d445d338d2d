use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinishSetupEmail {
    pub uid: String,
    pub email: String,
    pub product_id: String,
    pub product_name: String,
    pub metrics_context: Option<serde_json::Value>,
}

#[automock]
#[async_trait]
pub trait AccountMailer: Send + Sync {
    async fn send_finish_setup_email(&self, message: &FinishSetupEmail) -> Result<()>;
}
