use std::env;
use tracing::Level;
use url::Url;

#[derive(Clone, Debug)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct AlertConfig {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) alert: Option<AlertConfig>,
    /// Logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    fn from_lookup(component: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let component = component.trim().to_string();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let service_context = ServiceContext {
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            environment: non_empty("STAGE").unwrap_or_else(|| "unknown".to_string()),
            component,
        };

        let mut warnings = Vec::new();
        let alert = alert_from_lookup(&non_empty, &mut warnings);

        Self {
            service_context,
            alert,
            warnings,
        }
    }
}

fn alert_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
    warnings: &mut Vec<String>,
) -> Option<AlertConfig> {
    let enabled = lookup("ALERT_NOTIFY_ENABLED")
        .and_then(|raw| parse_bool(&raw))
        .unwrap_or(true);
    if !enabled {
        return None;
    }

    let raw_url = lookup("ALERT_WEBHOOK_URL")?;
    let webhook_url = match Url::parse(&raw_url) {
        Ok(url) => url,
        Err(err) => {
            // The raw url embeds a secret, only the parse error is reported.
            warnings.push(format!(
                "ALERT_WEBHOOK_URL is set but invalid; alerts disabled (parse error: {err})"
            ));
            return None;
        }
    };

    let min_level = match lookup("ALERT_NOTIFY_LEVEL") {
        Some(raw) => parse_level(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "ALERT_NOTIFY_LEVEL is invalid (value: {raw}); defaulting to ERROR"
            ));
            Level::ERROR
        }),
        None => Level::ERROR,
    };

    Some(AlertConfig {
        webhook_url,
        min_level,
    })
}

fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> ObservabilityConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ObservabilityConfig::from_lookup("backend", |key| vars.get(key).cloned())
    }

    #[test]
    fn alerts_disabled_without_webhook() {
        let config = config_with(&[]);
        assert!(config.alert.is_none());
        assert!(config.warnings.is_empty());
        assert_eq!(config.service_context.service_name, "backend");
        assert_eq!(config.service_context.environment, "unknown");
    }

    #[test]
    fn invalid_webhook_is_a_warning() {
        let config = config_with(&[("ALERT_WEBHOOK_URL", "not a url")]);
        assert!(config.alert.is_none());
        assert_eq!(config.warnings.len(), 1);
        assert!(!config.warnings[0].contains("not a url"));
    }

    #[test]
    fn level_defaults_to_error_when_invalid() {
        let config = config_with(&[
            ("ALERT_WEBHOOK_URL", "https://hooks.example.com/T000/B000"),
            ("ALERT_NOTIFY_LEVEL", "loud"),
        ]);
        let alert = config.alert.expect("alert config");
        assert_eq!(alert.min_level, Level::ERROR);
        assert_eq!(config.warnings.len(), 1);
    }

    #[test]
    fn explicit_disable_wins() {
        let config = config_with(&[
            ("ALERT_WEBHOOK_URL", "https://hooks.example.com/T000/B000"),
            ("ALERT_NOTIFY_ENABLED", "off"),
            ("ALERT_NOTIFY_LEVEL", "warn"),
        ]);
        assert!(config.alert.is_none());
    }
}
