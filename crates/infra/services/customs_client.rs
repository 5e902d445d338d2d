use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::http_support::ServiceHttp;
use crate::domain::{interfaces::customs::CustomsGate, value_objects::customs::CustomsVerdict};

#[derive(Serialize)]
struct CheckRequest<'a> {
    ip: &'a str,
    email: &'a str,
    action: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    block: bool,
    retry_after: Option<u64>,
}

pub struct CustomsClient {
    http: ServiceHttp,
}

impl CustomsClient {
    pub fn new(http: ServiceHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CustomsGate for CustomsClient {
    async fn check(&self, client_address: &str, email: &str, action: &str) -> Result<CustomsVerdict> {
        let resp = self
            .http
            .request(Method::POST, "/check")
            .json(&CheckRequest {
                ip: client_address,
                email,
                action,
            })
            .send()
            .await?;
        let resp = self.http.ensure_success(resp, "customs check").await?;
        let parsed: CheckResponse = resp.json().await?;

        if parsed.block {
            warn!(%action, retry_after = ?parsed.retry_after, "customs: request blocked");
            return Ok(CustomsVerdict::Blocked {
                retry_after_secs: parsed.retry_after,
            });
        }
        Ok(CustomsVerdict::Allowed)
    }
}
