use super::config::ServiceContext;
use super::notifier::{AlertDispatcher, AlertEvent, SpanSummary};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

const REDACTED: &str = "[REDACTED]";
const SELF_TARGET: &str = "observability";

/// Forwards events at or above `min_level` to the alert dispatcher.
#[derive(Clone)]
pub(crate) struct AlertLayer {
    dispatcher: AlertDispatcher,
    service_context: ServiceContext,
    min_level: Level,
}

impl AlertLayer {
    pub(crate) fn new(
        dispatcher: AlertDispatcher,
        service_context: ServiceContext,
        min_level: Level,
    ) -> Self {
        Self {
            dispatcher,
            service_context,
            min_level,
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    values: BTreeMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        let name = field.name();
        self.values.insert(name.to_string(), redact(name, value));
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }
}

struct SpanFields(BTreeMap<String, String>);

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        attrs.record(&mut collector);

        if collector.values.is_empty() {
            return;
        }

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(collector.values));
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut collector = FieldCollector::default();
        values.record(&mut collector);
        if collector.values.is_empty() {
            return;
        }

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(existing) => existing.0.extend(collector.values),
            None => extensions.insert(SpanFields(collector.values)),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level order is verbosity: ERROR is the smallest.
        if *metadata.level() > self.min_level || metadata.target() == SELF_TARGET {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let message = collector
            .values
            .remove("message")
            .map(|raw| unquote_debug_string(&raw));

        let spans = ctx
            .event_span(event)
            .map(|span| {
                span.scope()
                    .from_root()
                    .map(|span| SpanSummary {
                        name: span.metadata().name().to_string(),
                        fields: span
                            .extensions()
                            .get::<SpanFields>()
                            .map(|fields| fields.0.clone())
                            .unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        self.dispatcher.dispatch(AlertEvent {
            level: *metadata.level(),
            timestamp: Utc::now(),
            service_name: self.service_context.service_name.clone(),
            environment: self.service_context.environment.clone(),
            component: self.service_context.component.clone(),
            target: metadata.target().to_string(),
            file: metadata.file().map(str::to_string),
            line: metadata.line(),
            message,
            fields: collector.values,
            spans,
        });
    }
}

fn unquote_debug_string(input: &str) -> String {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

fn redact(field_name: &str, value: String) -> String {
    if is_sensitive_key(field_name) {
        return REDACTED.to_string();
    }
    value
}

/// Payment credentials and personal data never leave the process in alerts.
fn is_sensitive_key(field_name: &str) -> bool {
    const SENSITIVE: [&str; 10] = [
        "webhook",
        "secret",
        "password",
        "token",
        "authorization",
        "signature",
        "email",
        "ip_address",
        "client_address",
        "idempotency_key",
    ];

    let field = field_name.to_ascii_lowercase();
    SENSITIVE.iter().any(|needle| field.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_secrets_are_redacted() {
        for key in [
            "paypal_token",
            "stripe_secret_key",
            "email",
            "client_address",
            "idempotency_key",
            "nvp_signature",
        ] {
            assert_eq!(redact(key, "value".to_string()), REDACTED, "{key}");
        }
    }

    #[test]
    fn identifiers_are_kept() {
        assert_eq!(redact("customer_id", "cus_1".to_string()), "cus_1");
        assert_eq!(redact("subscription_id", "sub_1".to_string()), "sub_1");
    }

    #[test]
    fn debug_strings_lose_their_quotes() {
        assert_eq!(unquote_debug_string("\"charge failed\""), "charge failed");
        assert_eq!(unquote_debug_string("plain"), "plain");
        assert_eq!(unquote_debug_string("\""), "\"");
    }
}
