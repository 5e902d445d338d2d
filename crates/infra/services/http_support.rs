use anyhow::Result;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use tracing::error;

/// Shared reqwest setup for the internal collaborator services.
#[derive(Clone)]
pub struct ServiceHttp {
    http: reqwest::Client,
    base_url: String,
    auth_secret: String,
    service: &'static str,
}

impl ServiceHttp {
    pub fn new(
        service: &'static str,
        base_url: String,
        auth_secret: String,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_secret,
            service,
        })
    }

    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.auth_secret))
    }

    pub async fn ensure_success(
        &self,
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        error!(
            service = self.service,
            status = %status,
            response_body = %body,
            context = %context,
            "collaborator request failed"
        );

        anyhow::bail!("{} request failed: {} (status {})", self.service, context, status);
    }
}
