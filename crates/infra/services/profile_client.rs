use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;

use super::http_support::ServiceHttp;
use crate::domain::interfaces::profile::ProfileCache;

pub struct ProfileClient {
    http: ServiceHttp,
}

impl ProfileClient {
    pub fn new(http: ServiceHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProfileCache for ProfileClient {
    async fn delete_cache(&self, uid: &str) -> Result<()> {
        let resp = self
            .http
            .request(Method::DELETE, &format!("/v1/cache/{uid}"))
            .send()
            .await?;
        self.http.ensure_success(resp, "delete profile cache").await?;
        Ok(())
    }
}
