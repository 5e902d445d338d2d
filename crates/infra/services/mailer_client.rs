use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;

use super::http_support::ServiceHttp;
use crate::domain::interfaces::mailer::{AccountMailer, FinishSetupEmail};

pub struct MailerClient {
    http: ServiceHttp,
}

impl MailerClient {
    pub fn new(http: ServiceHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AccountMailer for MailerClient {
    async fn send_finish_setup_email(&self, message: &FinishSetupEmail) -> Result<()> {
        let resp = self
            .http
            .request(Method::POST, "/v1/send/subscription-account-finish-setup")
            .json(message)
            .send()
            .await?;
        self.http.ensure_success(resp, "send finish setup email").await?;
        Ok(())
    }
}
