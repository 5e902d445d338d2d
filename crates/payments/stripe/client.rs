use std::collections::HashMap;

use anyhow::Result;
use reqwest::{
    Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

use super::types::StripeErrorEnvelope;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

pub(crate) type FormBody = Vec<(String, String)>;

#[derive(Debug, Error)]
#[error("stripe api request failed: {context} (status {status}, request_id={request_id:?}, code={code:?})")]
pub struct StripeApiError {
    pub context: String,
    pub status: u16,
    pub request_id: Option<String>,
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub decline_code: Option<String>,
    pub message: Option<String>,
}

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
    /// Merchant tax id shown on invoices, keyed by uppercase currency.
    tax_ids: HashMap<String, String>,
}

impl StripeClient {
    pub fn new(secret_key: String, api_base: String, tax_ids: HashMap<String, String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            tax_ids: tax_ids
                .into_iter()
                .map(|(currency, id)| (currency.to_ascii_uppercase(), id))
                .collect(),
        }
    }

    pub(crate) fn tax_id_for_currency(&self, currency: &str) -> Option<&str> {
        self.tax_ids
            .get(&currency.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &FormBody,
        context: &str,
    ) -> Result<T> {
        let resp = self
            .http
            .get(format!("{}{}", self.api_base, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .query(query)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, context).await?;

        Ok(resp.json().await?)
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &FormBody,
        idempotency_key: Option<&str>,
        context: &str,
    ) -> Result<T> {
        self.send_form(Method::POST, path, body, idempotency_key, context)
            .await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        self.send_form(Method::DELETE, path, &Vec::new(), None, context)
            .await
    }

    async fn send_form<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &FormBody,
        idempotency_key: Option<&str>,
        context: &str,
    ) -> Result<T> {
        // https://stripe.com/docs/api/idempotent_requests
        let mut request = self
            .http
            .request(method, format!("{}{}", self.api_base, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(body);

        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let resp = request.send().await?;
        let resp = Self::ensure_success(resp, context).await?;

        Ok(resp.json().await?)
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .or_else(|| resp.headers().get("stripe-request-id"))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        let api_error = StripeApiError {
            context: context.to_string(),
            status: status.as_u16(),
            request_id,
            error_type: details.as_ref().and_then(|d| d.type_.clone()),
            code: details.as_ref().and_then(|d| d.code.clone()),
            decline_code: details.as_ref().and_then(|d| d.decline_code.clone()),
            message: details.as_ref().and_then(|d| d.message.clone()),
        };

        error!(
            status = %status,
            stripe_request_id = ?api_error.request_id,
            stripe_error_type = ?api_error.error_type,
            stripe_error_code = ?api_error.code,
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.clone()),
            stripe_error_message = ?api_error.message,
            stripe_decline_code = ?api_error.decline_code,
            context = %context,
            "stripe api request failed"
        );

        Err(api_error.into())
    }
}

/// Builds `expand[]` pairs in the form Stripe expects.
pub(crate) fn expand_params<'a>(paths: impl IntoIterator<Item = &'a str>) -> FormBody {
    paths
        .into_iter()
        .map(|path| ("expand[]".to_string(), path.to_string()))
        .collect()
}

pub(crate) fn field(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}
