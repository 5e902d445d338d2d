use super::notifier::{AlertEvent, AlertSink};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use url::Url;

const CONTENT_LIMIT: usize = 3500;

/// Posts alerts as `{"text": ...}` to a chat-style incoming webhook.
pub(crate) struct WebhookAlertSink {
    webhook_url: Url,
    client: Client,
}

impl WebhookAlertSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(3)).build()?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

pub(crate) fn format_alert(event: &AlertEvent) -> String {
    let mut lines = vec![format!(
        "*{}* `{}` `{}` `{}`",
        event.service_name,
        event.environment,
        event.component,
        event.level.as_str()
    )];

    let location = match (&event.file, event.line) {
        (Some(file), Some(line)) => format!(" `{file}:{line}`"),
        _ => String::new(),
    };
    lines.push(format!(
        "`{}` `{}`{}",
        event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        event.target,
        location
    ));

    if let Some(message) = event.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(format!("> {message}"));
    }

    for (key, value) in &event.fields {
        lines.push(format!("• `{key}` = `{value}`"));
    }

    if !event.spans.is_empty() {
        let chain = event
            .spans
            .iter()
            .map(|span| span.name.as_str())
            .collect::<Vec<_>>()
            .join(" > ");
        lines.push(format!("spans: `{chain}`"));

        for span in event.spans.iter().filter(|span| !span.fields.is_empty()) {
            for (key, value) in &span.fields {
                lines.push(format!("• `{}.{key}` = `{value}`", span.name));
            }
        }
    }

    truncate(lines.join("\n"))
}

fn truncate(content: String) -> String {
    const SUFFIX: &str = "\n(truncated)";

    if content.chars().count() <= CONTENT_LIMIT {
        return content;
    }

    let keep = CONTENT_LIMIT - SUFFIX.chars().count();
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(SUFFIX);
    truncated
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "text": format_alert(event) }))
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "alert webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn sink_name(&self) -> &'static str {
        "webhook"
    }
}

// reqwest errors embed the request url, which carries the webhook secret.
fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("alert webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("alert webhook connection failed");
    }
    anyhow!("alert webhook request failed")
}
