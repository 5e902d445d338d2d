use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::http_support::ServiceHttp;
use crate::domain::interfaces::push::DevicePush;

pub struct PushClient {
    http: ServiceHttp,
}

impl PushClient {
    pub fn new(http: ServiceHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DevicePush for PushClient {
    async fn notify_profile_updated(&self, uid: &str) -> Result<()> {
        let resp = self
            .http
            .request(Method::POST, "/v1/push/profile-updated")
            .json(&json!({ "uid": uid }))
            .send()
            .await?;
        self.http.ensure_success(resp, "push profile updated").await?;
        Ok(())
    }
}
